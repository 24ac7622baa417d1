//! Reference catalog endpoints: chicken types and cost categories.

use crate::models::{CreateChickenType, CreateCostCategory};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;
use validator::Validate;

pub async fn create_chicken_type(
    State(state): State<AppState>,
    Json(input): Json<CreateChickenType>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let chicken_type = state.db.create_chicken_type(&input).await?;
    Ok((StatusCode::CREATED, Json(chicken_type)))
}

pub async fn list_chicken_types(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.db.list_chicken_types().await?))
}

pub async fn create_cost_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCostCategory>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let category = state.db.create_cost_category(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_cost_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.db.list_cost_categories().await?))
}
