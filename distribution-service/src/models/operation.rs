//! Daily operation model and lifecycle states.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{
    DailyCost, DistributionResult, FarmTransaction, SaleTransaction, TransportLoss,
};

/// Lifecycle state of a daily operation. `Open` accepts recordings; `Closed`
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Open,
    Closed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Open => "open",
            OperationStatus::Closed => "closed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "closed" => OperationStatus::Closed,
            _ => OperationStatus::Open,
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One calendar day's distribution run, scoped to a single vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyOperation {
    pub operation_id: Uuid,
    pub operation_date: NaiveDate,
    pub vehicle_id: Uuid,
    pub created_by: Uuid,
    pub status: String,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub closed_utc: Option<DateTime<Utc>>,
}

impl DailyOperation {
    pub fn parsed_status(&self) -> OperationStatus {
        OperationStatus::from_string(&self.status)
    }

    pub fn is_open(&self) -> bool {
        self.parsed_status() == OperationStatus::Open
    }
}

/// Input for starting a daily operation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOperation {
    pub operation_date: NaiveDate,
    pub vehicle_id: Uuid,
    pub created_by: Uuid,
    pub notes: Option<String>,
}

/// An operation with all of its recorded child rows, for day views and
/// reports.
#[derive(Debug, Clone, Serialize)]
pub struct OperationDetail {
    pub operation: DailyOperation,
    pub farm_transactions: Vec<FarmTransaction>,
    pub sale_transactions: Vec<SaleTransaction>,
    pub transport_losses: Vec<TransportLoss>,
    pub daily_costs: Vec<DailyCost>,
    pub distribution: Option<DistributionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_repr() {
        assert_eq!(
            OperationStatus::from_string(OperationStatus::Open.as_str()),
            OperationStatus::Open
        );
        assert_eq!(
            OperationStatus::from_string(OperationStatus::Closed.as_str()),
            OperationStatus::Closed
        );
    }

    #[test]
    fn unknown_status_defaults_to_open() {
        assert_eq!(OperationStatus::from_string("weird"), OperationStatus::Open);
    }
}
