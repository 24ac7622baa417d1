//! Vehicle registry endpoints.

use crate::models::{CreateVehicle, UpdateVehicle};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(input): Json<CreateVehicle>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let vehicle = state.db.create_vehicle(&input).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn list_vehicles(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.db.list_vehicles().await?))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = state
        .db
        .get_vehicle(vehicle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Vehicle {} not found", vehicle_id)))?;
    Ok(Json(vehicle))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    Json(input): Json<UpdateVehicle>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let vehicle = state.db.update_vehicle(vehicle_id, &input).await?;
    Ok(Json(vehicle))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_vehicle(vehicle_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
