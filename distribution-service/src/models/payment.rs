//! Standalone debt payments against farms and buyers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_positive;

/// A payment we made to a farm, reducing what we owe it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FarmDebtPayment {
    pub payment_id: Uuid,
    pub farm_id: Uuid,
    pub operation_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub recorded_utc: DateTime<Utc>,
}

/// A payment a buyer made to us, reducing what it owes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BuyerDebtPayment {
    pub payment_id: Uuid,
    pub buyer_id: Uuid,
    pub operation_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub recorded_utc: DateTime<Utc>,
}

/// Input for recording a debt payment. The operation reference is optional
/// metadata only; the payment is independent of any operation's lifecycle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordDebtPayment {
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub operation_id: Option<Uuid>,
}

/// Full debt history for one farm or buyer: every transaction that raised
/// the balance and every payment that lowered it.
#[derive(Debug, Clone, Serialize)]
pub struct DebtHistory<T, P> {
    pub current_debt: Decimal,
    pub transactions: Vec<T>,
    pub payments: Vec<P>,
    pub total_transacted: Decimal,
    pub total_paid: Decimal,
}
