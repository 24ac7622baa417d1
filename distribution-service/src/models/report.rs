//! Read-only report shapes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::OperationDetail;

/// Daily report: the operation's full detail plus per-section totals.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub detail: OperationDetail,
    pub purchase_total: Decimal,
    pub sale_total: Decimal,
    pub loss_total: Decimal,
    pub cost_total: Decimal,
}

/// Aggregate distribution totals over a date range.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodTotals {
    pub total_revenue: Decimal,
    pub total_purchases: Decimal,
    pub total_losses: Decimal,
    pub total_costs: Decimal,
    pub vehicle_costs: Decimal,
    pub net_profit: Decimal,
}

/// One partner's cumulative shares over a date range.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PartnerPeriodTotals {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub total_base_share: Decimal,
    pub total_vehicle_cost_share: Decimal,
    pub total_final_profit: Decimal,
}

/// Period profit report: closed-day totals and per-partner cumulative
/// shares between two dates inclusive.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodProfitReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub operations_closed: i64,
    pub totals: PeriodTotals,
    pub partner_totals: Vec<PartnerPeriodTotals>,
}
