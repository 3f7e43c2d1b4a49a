//! Trip task implementation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::config::SimulatorConfig;
use crate::events::{DeliveryBroadcaster, DeliveryEvent, FleetEvent, TripStats};
use crate::fleet::{Drone, FleetStore};
use crate::geo::{haversine_km, Location};
use crate::orders::{OrderStatus, OrderStatusClient};

use super::types::{Trip, TripHandle};

/// Progress at or beyond this is clamped to exactly 1.0, so step
/// accumulation error can never leave a trip hovering short of completion.
const COMPLETION_CLAMP: f64 = 0.99;

/// Spawns and drives per-trip flight tasks.
///
/// All collaborators are injected at construction; no ambient globals.
pub struct FlightSimulator {
    config: SimulatorConfig,
    fleet: Arc<dyn FleetStore>,
    broadcaster: Arc<DeliveryBroadcaster>,
    orders: Arc<dyn OrderStatusClient>,
}

impl FlightSimulator {
    pub fn new(
        config: SimulatorConfig,
        fleet: Arc<dyn FleetStore>,
        broadcaster: Arc<DeliveryBroadcaster>,
        orders: Arc<dyn OrderStatusClient>,
    ) -> Self {
        Self {
            config,
            fleet,
            broadcaster,
            orders,
        }
    }

    /// Start simulating a flight for a reserved drone.
    ///
    /// Returns immediately; the trip runs on its own task with its own timer
    /// until completion or cancellation.
    pub fn start(
        &self,
        drone: &Drone,
        order_id: &str,
        start: Location,
        end: Location,
    ) -> TripHandle {
        let trip = Trip {
            order_id: order_id.to_string(),
            drone_name: drone.name.clone(),
            start,
            end,
            total_distance_km: haversine_km(start, end),
            progress: 0.0,
            started_at: Utc::now(),
        };

        info!(
            "Drone {} departing for order {}: [{}, {}] -> [{}, {}], {:.2} km",
            trip.drone_name,
            trip.order_id,
            start.lat,
            start.lng,
            end.lat,
            end.lng,
            trip.total_distance_km
        );

        let (cancel_tx, cancel_rx) = broadcast::channel(1);
        let runner = TripRunner {
            trip,
            step: self.config.progress_step,
            tick: Duration::from_millis(self.config.tick_interval_ms),
            fleet: Arc::clone(&self.fleet),
            broadcaster: Arc::clone(&self.broadcaster),
            orders: Arc::clone(&self.orders),
        };

        let order_id = order_id.to_string();
        let drone_name = drone.name.clone();
        let task = tokio::spawn(runner.run(cancel_rx));

        TripHandle::new(order_id, drone_name, cancel_tx, task)
    }
}

/// Owned state of one running trip.
struct TripRunner {
    trip: Trip,
    step: f64,
    tick: Duration,
    fleet: Arc<dyn FleetStore>,
    broadcaster: Arc<DeliveryBroadcaster>,
    orders: Arc<dyn OrderStatusClient>,
}

impl TripRunner {
    async fn run(mut self, mut cancel_rx: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.tick);
        // The first interval tick completes immediately; consume it so the
        // first position update lands one full period after departure.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    self.abort().await;
                    return;
                }
                _ = interval.tick() => {
                    if self.advance().await {
                        return;
                    }
                }
            }
        }
    }

    /// Advance one tick. Returns true when the trip reached its terminal
    /// state and the task should end.
    async fn advance(&mut self) -> bool {
        self.trip.progress += self.step;
        if self.trip.progress >= COMPLETION_CLAMP {
            self.trip.progress = 1.0;
        }

        let position = Location::lerp(self.trip.start, self.trip.end, self.trip.progress);
        let traveled = self.trip.total_distance_km * self.trip.progress;
        let remaining = (self.trip.total_distance_km - traveled).max(0.0);

        if let Err(e) = self
            .fleet
            .update_position(&self.trip.drone_name, position)
            .await
        {
            // Keep flying; the broadcast below is still worth publishing.
            warn!(
                "Failed to record position for drone {}: {}",
                self.trip.drone_name, e
            );
        }

        if self.trip.progress < 1.0 {
            self.broadcaster.publish(
                &self.trip.order_id,
                DeliveryEvent::Delivering {
                    order_id: self.trip.order_id.clone(),
                    drone_id: self.trip.drone_name.clone(),
                    location: position,
                    progress: round2(self.trip.progress),
                    stats: TripStats::from_km(self.trip.total_distance_km, traveled, remaining),
                    message: "Drone en route to your location".to_string(),
                },
            );
            return false;
        }

        self.complete().await;
        true
    }

    /// Terminal handling once progress hit 1.0.
    ///
    /// Order matters: the tracking UI hears about completion first, then the
    /// order service, then the fleet. Downstream failures are logged and
    /// never stop the drone from being released.
    async fn complete(&self) {
        info!(
            "Drone {} completed order {}",
            self.trip.drone_name, self.trip.order_id
        );

        self.broadcaster.publish(
            &self.trip.order_id,
            DeliveryEvent::Delivered {
                order_id: self.trip.order_id.clone(),
                drone_id: self.trip.drone_name.clone(),
                location: self.trip.end,
                progress: 1.0,
                stats: TripStats::from_km(
                    self.trip.total_distance_km,
                    self.trip.total_distance_km,
                    0.0,
                ),
                message: "Delivered successfully. Thank you!".to_string(),
            },
        );

        if let Err(e) = self
            .orders
            .update_status(&self.trip.order_id, OrderStatus::Delivered, None)
            .await
        {
            error!(
                "Failed to mark order {} delivered: {}",
                self.trip.order_id, e
            );
        }

        match self.fleet.release(&self.trip.drone_name).await {
            Ok(drone) => {
                self.broadcaster
                    .publish_global(FleetEvent::DroneUpdate { drone });
            }
            Err(e) => {
                error!("Failed to release drone {}: {}", self.trip.drone_name, e);
            }
        }

        self.broadcaster.drop_scope(&self.trip.order_id);
    }

    /// Cancellation path: no delivery events, no order notification, but the
    /// drone must not stay busy forever.
    async fn abort(&self) {
        warn!(
            "Trip for order {} cancelled at progress {:.2}",
            self.trip.order_id, self.trip.progress
        );

        match self.fleet.release(&self.trip.drone_name).await {
            Ok(drone) => {
                self.broadcaster
                    .publish_global(FleetEvent::DroneUpdate { drone });
            }
            Err(e) => {
                error!("Failed to release drone {}: {}", self.trip.drone_name, e);
            }
        }

        self.broadcaster.drop_scope(&self.trip.order_id);
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
