pub mod buyers;
pub mod catalog;
pub mod farms;
pub mod health;
pub mod operations;
pub mod partners;
pub mod reports;
pub mod vehicles;

pub use health::{health_check, metrics, readiness_check};
