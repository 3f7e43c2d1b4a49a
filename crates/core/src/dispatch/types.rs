//! Types for dispatch operations.

use serde::Deserialize;
use thiserror::Error;

use crate::fleet::Drone;
use crate::flight::TripHandle;
use crate::geo::Location;

/// Errors surfaced synchronously to the dispatch caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid dispatch request: {0}")]
    InvalidRequest(String),

    #[error("No drone available for assignment")]
    NoDroneAvailable,

    #[error("Drone {name} has low battery ({battery}%), choose another drone")]
    LowBattery { name: String, battery: u8 },
}

/// A request to start a delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub order_id: String,
    /// Originating branch, informational only.
    #[serde(default)]
    pub branch_id: Option<String>,
    /// Explicitly requested drone; otherwise any eligible drone is chosen.
    #[serde(default)]
    pub drone_id: Option<String>,
    pub start_location: Location,
    pub end_location: Location,
}

/// Result of a successful dispatch: the reserved drone's public view plus a
/// handle to the autonomous trip task.
#[derive(Debug)]
pub struct Dispatched {
    pub drone: Drone,
    pub handle: TripHandle,
}
