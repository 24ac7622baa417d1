//! Reference catalogs: chicken types and cost categories.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChickenType {
    pub chicken_type_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChickenType {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
}

/// Cost category. `is_vehicle_cost` decides which bucket a daily cost lands
/// in when the day is closed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CostCategory {
    pub cost_category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_vehicle_cost: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCostCategory {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_vehicle_cost: bool,
}
