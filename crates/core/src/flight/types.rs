//! Types for flight simulation.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::geo::Location;

/// One simulated flight tying an order to a drone between two coordinates.
///
/// Ephemeral: created at dispatch handoff, owned exclusively by one simulator
/// task, gone when the trip completes. At most one live trip exists per order
/// and per drone; the busy reservation enforces both.
#[derive(Debug, Clone)]
pub struct Trip {
    pub order_id: String,
    pub drone_name: String,
    pub start: Location,
    pub end: Location,
    /// Computed once at trip start via the haversine formula.
    pub total_distance_km: f64,
    /// Monotonically non-decreasing, 0.0 to 1.0.
    pub progress: f64,
    pub started_at: DateTime<Utc>,
}

/// Handle to a running trip task.
#[derive(Debug)]
pub struct TripHandle {
    pub order_id: String,
    pub drone_name: String,
    cancel_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl TripHandle {
    pub(super) fn new(
        order_id: String,
        drone_name: String,
        cancel_tx: broadcast::Sender<()>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            order_id,
            drone_name,
            cancel_tx,
            task,
        }
    }

    /// Request cancellation; the task checks for it on every tick.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(());
    }

    /// Wait for the trip task to finish (completed or cancelled).
    pub async fn await_completion(self) {
        let _ = self.task.await;
    }

    /// Whether the trip task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
