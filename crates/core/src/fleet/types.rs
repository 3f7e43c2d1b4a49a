//! Types for fleet operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Location;

/// Errors that can occur during fleet operations.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Drone not found: {0}")]
    NotFound(String),

    #[error("Drone name already exists: {0}")]
    DuplicateName(String),

    #[error("Drone {name} has low battery ({battery}%)")]
    LowBattery { name: String, battery: u8 },

    #[error("Drone {0} is already reserved")]
    AlreadyReserved(String),

    #[error("No eligible drone available")]
    NoneAvailable,

    #[error("Drone {0} is busy with an active delivery")]
    Busy(String),
}

/// Operational state of a drone.
///
/// This is the canonical vocabulary for the core; legacy lowercase spellings
/// observed in older fleet data (`available`, `busy`) are accepted on input
/// and normalized here, never re-emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    #[serde(alias = "available", alias = "idle")]
    Idle,
    #[serde(alias = "busy")]
    Busy,
    #[serde(alias = "maintenance")]
    Maintenance,
}

impl DroneStatus {
    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            DroneStatus::Idle => "IDLE",
            DroneStatus::Busy => "BUSY",
            DroneStatus::Maintenance => "MAINTENANCE",
        }
    }
}

/// A delivery drone.
///
/// Invariant: `status == Busy` iff `current_order_id.is_some()`. The registry
/// is the only writer, so every mutation path upholds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    /// Unique name, also used as the external reference id in events.
    pub name: String,
    pub status: DroneStatus,
    /// Battery percentage, 0-100.
    pub battery: u8,
    /// Order currently being served, present iff `status == Busy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_order_id: Option<String>,
    /// Last known position.
    pub current_location: Location,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Drone {
    /// Whether the invariant between status and current order holds.
    pub fn invariant_holds(&self) -> bool {
        (self.status == DroneStatus::Busy) == self.current_order_id.is_some()
    }
}

/// Request to register a new drone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDroneRequest {
    pub name: String,
    #[serde(default)]
    pub status: Option<DroneStatus>,
    #[serde(default)]
    pub battery: Option<u8>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Partial update applied by fleet administration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDroneRequest {
    #[serde(default)]
    pub status: Option<DroneStatus>,
    #[serde(default)]
    pub battery: Option<u8>,
    #[serde(default)]
    pub location: Option<Location>,
}
