//! Sale transaction model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_non_negative;

/// A sale of chickens to a buyer. A single sale can both create new debt
/// (the unpaid remainder) and retire old debt (`old_debt_paid`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleTransaction {
    pub transaction_id: Uuid,
    pub operation_id: Uuid,
    pub buyer_id: Uuid,
    pub chicken_type_id: Uuid,
    pub sequence_number: i32,
    pub loaded_cages_weight: Decimal,
    pub empty_cages_weight: Decimal,
    pub cage_count: i32,
    pub net_chicken_weight: Decimal,
    pub price_per_kg: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub old_debt_paid: Decimal,
    pub recorded_utc: DateTime<Utc>,
}

/// Input for recording a sale.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordSale {
    pub buyer_id: Uuid,
    pub chicken_type_id: Uuid,
    #[validate(custom(function = "validate_non_negative"))]
    pub loaded_cages_weight: Decimal,
    #[validate(custom(function = "validate_non_negative"))]
    pub empty_cages_weight: Decimal,
    #[validate(range(min = 0, message = "Cage count must not be negative"))]
    pub cage_count: i32,
    #[validate(custom(function = "validate_non_negative"))]
    pub price_per_kg: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub paid_amount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub old_debt_paid: Decimal,
}
