//! Farm registry and farm-side debt ledger endpoints.

use crate::models::{CreateFarm, RecordDebtPayment, UpdateFarm};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn create_farm(
    State(state): State<AppState>,
    Json(input): Json<CreateFarm>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let farm = state.db.create_farm(&input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

pub async fn list_farms(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.db.list_farms().await?))
}

pub async fn get_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let farm = state
        .db
        .get_farm(farm_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Farm {} not found", farm_id)))?;
    Ok(Json(farm))
}

pub async fn update_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<UpdateFarm>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let farm = state.db.update_farm(farm_id, &input).await?;
    Ok(Json(farm))
}

pub async fn delete_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_farm(farm_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_farm_debt_payment(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<RecordDebtPayment>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let payment = state.db.record_farm_debt_payment(farm_id, &input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get_farm_debt_history(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (farm, history) = state
        .db
        .get_farm_debt_history(farm_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Farm {} not found", farm_id)))?;
    Ok(Json(json!({ "farm": farm, "history": history })))
}
