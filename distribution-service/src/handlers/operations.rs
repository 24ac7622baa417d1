//! Daily operation lifecycle and recorder endpoints.

use crate::models::{
    CreateOperation, RecordDailyCost, RecordFarmPurchase, RecordSale, RecordTransportLoss,
};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn start_operation(
    State(state): State<AppState>,
    Json(input): Json<CreateOperation>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state.db.create_operation(&input).await?;
    Ok((StatusCode::CREATED, Json(operation)))
}

pub async fn get_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .db
        .get_operation(operation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Operation {} not found", operation_id)))?;
    Ok(Json(detail))
}

pub async fn get_operation_by_date(
    State(state): State<AppState>,
    Path(operation_date): Path<NaiveDate>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .db
        .get_operation_by_date(operation_date)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("No operation on {}", operation_date))
        })?;
    Ok(Json(detail))
}

pub async fn close_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.db.close_operation(operation_id).await?;
    Ok(Json(result))
}

pub async fn record_farm_purchase(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
    Json(input): Json<RecordFarmPurchase>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let transaction = state.db.record_farm_purchase(operation_id, &input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn record_sale(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
    Json(input): Json<RecordSale>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let transaction = state.db.record_sale(operation_id, &input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn record_transport_loss(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
    Json(input): Json<RecordTransportLoss>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let loss = state.db.record_transport_loss(operation_id, &input).await?;
    Ok((StatusCode::CREATED, Json(loss)))
}

pub async fn record_daily_cost(
    State(state): State<AppState>,
    Path(operation_id): Path<Uuid>,
    Json(input): Json<RecordDailyCost>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let cost = state.db.record_daily_cost(operation_id, &input).await?;
    Ok((StatusCode::CREATED, Json(cost)))
}
