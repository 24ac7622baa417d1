//! Capital partner registry endpoints.

use crate::models::{CreatePartner, UpdatePartner};
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

pub async fn create_partner(
    State(state): State<AppState>,
    Json(input): Json<CreatePartner>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let partner = state.db.create_partner(&input).await?;
    Ok((StatusCode::CREATED, Json(partner)))
}

pub async fn list_partners(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.db.list_partners().await?))
}

pub async fn get_partner(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let partner = state
        .db
        .get_partner(partner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Partner {} not found", partner_id)))?;
    Ok(Json(partner))
}

pub async fn update_partner(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    Json(input): Json<UpdatePartner>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let partner = state.db.update_partner(partner_id, &input).await?;
    Ok(Json(partner))
}

pub async fn delete_partner(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_partner(partner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
