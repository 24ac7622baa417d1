//! Capital partner model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_non_negative;

/// A capital partner. `investment_percentage` is this partner's claim on net
/// profit; across all partners the percentages are expected to sum to 100
/// (surfaced through the close-time reconciliation warning, not enforced).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Partner {
    pub partner_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub investment_amount: Decimal,
    pub investment_percentage: Decimal,
    pub is_vehicle_partner: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for registering a partner.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePartner {
    #[validate(length(min = 1, max = 100, message = "Partner name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub investment_amount: Decimal,
    pub investment_percentage: Decimal,
    #[serde(default)]
    pub is_vehicle_partner: bool,
}

/// Input for updating a partner.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePartner {
    #[validate(length(min = 1, max = 100, message = "Partner name is required"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub investment_amount: Option<Decimal>,
    pub investment_percentage: Option<Decimal>,
    pub is_vehicle_partner: Option<bool>,
}
