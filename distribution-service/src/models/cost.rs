//! Daily operating cost model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_positive;

/// An operating expense recorded against the day. Whether it counts as a
/// vehicle cost is decided by its category at close time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyCost {
    pub cost_id: Uuid,
    pub operation_id: Uuid,
    pub cost_category_id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
    pub recorded_utc: DateTime<Utc>,
}

/// Input for recording a daily cost.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordDailyCost {
    pub cost_category_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    pub description: Option<String>,
}
