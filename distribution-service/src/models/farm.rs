//! Farm model. `total_debt` is a running balance owned by the recorder and
//! the debt-payment path; it is never written through entity updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A supplier farm we purchase chickens from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Farm {
    pub farm_id: Uuid,
    pub name: String,
    pub owner_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub total_debt: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// Input for registering a farm.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFarm {
    #[validate(length(min = 1, max = 100, message = "Farm name is required"))]
    pub name: String,
    pub owner_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating a farm's contact details. Deliberately has no
/// `total_debt` field.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFarm {
    #[validate(length(min = 1, max = 100, message = "Farm name is required"))]
    pub name: Option<String>,
    pub owner_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}
