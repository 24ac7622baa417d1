//! Reporting endpoints.

use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

pub async fn daily_report(
    State(state): State<AppState>,
    Path(operation_date): Path<NaiveDate>,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .db
        .get_daily_report(operation_date)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("No operation on {}", operation_date))
        })?;
    Ok(Json(report))
}

pub async fn period_profit_report(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.from_date > params.to_date {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "from_date must not be after to_date"
        )));
    }
    let report = state
        .db
        .get_period_profit_report(params.from_date, params.to_date)
        .await?;
    Ok(Json(report))
}
