//! Transport loss model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_non_negative;

/// Chickens that died in transit. A pure cost; no debt effect.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransportLoss {
    pub loss_id: Uuid,
    pub operation_id: Uuid,
    pub chicken_type_id: Uuid,
    pub dead_weight: Decimal,
    pub price_per_kg: Decimal,
    pub loss_amount: Decimal,
    pub location: Option<String>,
    pub recorded_utc: DateTime<Utc>,
}

/// Input for recording a transport loss.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordTransportLoss {
    pub chicken_type_id: Uuid,
    #[validate(custom(function = "validate_non_negative"))]
    pub dead_weight: Decimal,
    #[validate(custom(function = "validate_non_negative"))]
    pub price_per_kg: Decimal,
    pub location: Option<String>,
}
