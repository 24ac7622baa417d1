//! Domain models for distribution-service.

pub mod buyer;
pub mod catalog;
pub mod cost;
pub mod distribution;
pub mod farm;
pub mod loss;
pub mod operation;
pub mod partner;
pub mod payment;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod vehicle;

pub use buyer::{Buyer, CreateBuyer, UpdateBuyer};
pub use catalog::{ChickenType, CostCategory, CreateChickenType, CreateCostCategory};
pub use cost::{DailyCost, RecordDailyCost};
pub use distribution::{DistributionResult, PartnerProfit, PartnerShare, ProfitDistribution};
pub use farm::{CreateFarm, Farm, UpdateFarm};
pub use loss::{RecordTransportLoss, TransportLoss};
pub use operation::{CreateOperation, DailyOperation, OperationDetail, OperationStatus};
pub use partner::{CreatePartner, Partner, UpdatePartner};
pub use payment::{BuyerDebtPayment, DebtHistory, FarmDebtPayment, RecordDebtPayment};
pub use purchase::{FarmTransaction, RecordFarmPurchase};
pub use report::{DailyReport, PartnerPeriodTotals, PeriodProfitReport, PeriodTotals};
pub use sale::{RecordSale, SaleTransaction};
pub use vehicle::{CreateVehicle, UpdateVehicle, Vehicle};

use rust_decimal::Decimal;
use validator::ValidationError;

/// Shared validator for money and weight inputs that must not be negative.
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("must not be negative"));
    }
    Ok(())
}

/// Shared validator for inputs that must be strictly positive.
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("must be positive"));
    }
    Ok(())
}
