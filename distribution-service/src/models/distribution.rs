//! Profit distribution models: the immutable close-time record of a day's
//! aggregates and each partner's allocated share.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The once-per-operation financial summary written when a day is closed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfitDistribution {
    pub distribution_id: Uuid,
    pub operation_id: Uuid,
    pub total_revenue: Decimal,
    pub total_purchases: Decimal,
    pub total_losses: Decimal,
    pub total_costs: Decimal,
    pub vehicle_costs: Decimal,
    pub net_profit: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// One partner's allocated share of a distribution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PartnerProfit {
    pub partner_profit_id: Uuid,
    pub distribution_id: Uuid,
    pub partner_id: Uuid,
    pub base_profit_share: Decimal,
    pub vehicle_cost_share: Decimal,
    pub final_profit: Decimal,
}

/// A partner's share enriched with the partner fields callers want to show.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PartnerShare {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub investment_percentage: Decimal,
    pub is_vehicle_partner: bool,
    pub base_profit_share: Decimal,
    pub vehicle_cost_share: Decimal,
    pub final_profit: Decimal,
}

/// What `close` returns: the distribution row plus per-partner shares and
/// the non-vehicle cost bucket.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionResult {
    pub distribution: ProfitDistribution,
    pub other_costs: Decimal,
    pub partner_shares: Vec<PartnerShare>,
}
