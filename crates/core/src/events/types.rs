//! Wire-level event types.

use serde::{Deserialize, Serialize};

use crate::fleet::Drone;
use crate::geo::Location;

/// Distance statistics attached to progress events.
///
/// Values are pre-formatted `"{:.2} km"` strings; the tracking UI renders
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripStats {
    pub total: String,
    pub traveled: String,
    pub remaining: String,
}

impl TripStats {
    pub fn from_km(total: f64, traveled: f64, remaining: f64) -> Self {
        Self {
            total: format!("{:.2} km", total),
            traveled: format!("{:.2} km", traveled),
            remaining: format!("{:.2} km", remaining),
        }
    }
}

/// An event scoped to one order's broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryEvent {
    /// A drone was reserved for the order.
    #[serde(rename_all = "camelCase")]
    DroneAssigned {
        order_id: String,
        drone_id: String,
        message: String,
    },
    /// Periodic in-flight progress update.
    #[serde(rename_all = "camelCase")]
    Delivering {
        order_id: String,
        drone_id: String,
        location: Location,
        /// Rounded to two decimals.
        progress: f64,
        stats: TripStats,
        message: String,
    },
    /// Terminal event, published exactly once per trip.
    #[serde(rename_all = "camelCase")]
    Delivered {
        order_id: String,
        drone_id: String,
        location: Location,
        progress: f64,
        stats: TripStats,
        message: String,
    },
}

impl DeliveryEvent {
    pub fn order_id(&self) -> &str {
        match self {
            DeliveryEvent::DroneAssigned { order_id, .. }
            | DeliveryEvent::Delivering { order_id, .. }
            | DeliveryEvent::Delivered { order_id, .. } => order_id,
        }
    }

    pub fn progress(&self) -> f64 {
        match self {
            DeliveryEvent::DroneAssigned { .. } => 0.0,
            DeliveryEvent::Delivering { progress, .. }
            | DeliveryEvent::Delivered { progress, .. } => *progress,
        }
    }
}

/// A fleet-wide event delivered to every connection, unscoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FleetEvent {
    /// A drone changed state; fleet-monitoring dashboards refresh from this.
    DroneUpdate { drone: Drone },
}
