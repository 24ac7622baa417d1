//! Buyer model. Like farms, `total_debt` moves only with sales and debt
//! payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A customer we sell chickens to, typically a shop.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Buyer {
    pub buyer_id: Uuid,
    pub name: String,
    pub shop_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub total_debt: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// Input for registering a buyer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBuyer {
    #[validate(length(min = 1, max = 100, message = "Buyer name is required"))]
    pub name: String,
    pub shop_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating a buyer's contact details; never touches `total_debt`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBuyer {
    #[validate(length(min = 1, max = 100, message = "Buyer name is required"))]
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}
