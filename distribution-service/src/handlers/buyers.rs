//! Buyer registry and buyer-side debt ledger endpoints.

use crate::models::{CreateBuyer, RecordDebtPayment, UpdateBuyer};
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

pub async fn create_buyer(
    State(state): State<AppState>,
    Json(input): Json<CreateBuyer>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let buyer = state.db.create_buyer(&input).await?;
    Ok((StatusCode::CREATED, Json(buyer)))
}

pub async fn list_buyers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.db.list_buyers().await?))
}

pub async fn get_buyer(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let buyer = state
        .db
        .get_buyer(buyer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Buyer {} not found", buyer_id)))?;
    Ok(Json(buyer))
}

pub async fn update_buyer(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
    Json(input): Json<UpdateBuyer>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let buyer = state.db.update_buyer(buyer_id, &input).await?;
    Ok(Json(buyer))
}

pub async fn delete_buyer(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.db.delete_buyer(buyer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_buyer_debt_payment(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
    Json(input): Json<RecordDebtPayment>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let payment = state.db.record_buyer_debt_payment(buyer_id, &input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get_buyer_debt_history(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (buyer, history) = state
        .db
        .get_buyer_debt_history(buyer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Buyer {} not found", buyer_id)))?;
    Ok(Json(json!({ "buyer": buyer, "history": history })))
}
