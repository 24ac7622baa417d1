//! Farm purchase transaction model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_non_negative;

/// A purchase of chickens from a farm. Immutable once recorded; the unpaid
/// remainder is added to the farm's debt in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FarmTransaction {
    pub transaction_id: Uuid,
    pub operation_id: Uuid,
    pub farm_id: Uuid,
    pub chicken_type_id: Uuid,
    pub sequence_number: i32,
    pub empty_vehicle_weight: Decimal,
    pub loaded_vehicle_weight: Decimal,
    pub cage_count: i32,
    pub cage_weight_per_unit: Decimal,
    pub net_chicken_weight: Decimal,
    pub price_per_kg: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub recorded_utc: DateTime<Utc>,
}

/// Input for recording a farm purchase. Derived fields (net weight, totals,
/// remainder) are computed by the service, never supplied by the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordFarmPurchase {
    pub farm_id: Uuid,
    pub chicken_type_id: Uuid,
    #[validate(custom(function = "validate_non_negative"))]
    pub empty_vehicle_weight: Decimal,
    #[validate(custom(function = "validate_non_negative"))]
    pub loaded_vehicle_weight: Decimal,
    #[validate(range(min = 0, message = "Cage count must not be negative"))]
    pub cage_count: i32,
    #[validate(custom(function = "validate_non_negative"))]
    pub cage_weight_per_unit: Decimal,
    #[validate(custom(function = "validate_non_negative"))]
    pub price_per_kg: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub paid_amount: Decimal,
}
