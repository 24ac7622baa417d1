//! Delivery vehicle model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A delivery vehicle; each daily operation is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub vehicle_id: Uuid,
    pub plate_number: String,
    pub model: Option<String>,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for registering a vehicle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicle {
    #[validate(length(min = 1, max = 20, message = "Plate number is required"))]
    pub plate_number: String,
    pub model: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a vehicle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateVehicle {
    #[validate(length(min = 1, max = 20, message = "Plate number is required"))]
    pub plate_number: Option<String>,
    pub model: Option<String>,
    pub notes: Option<String>,
}
