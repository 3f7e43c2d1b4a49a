//! Dispatch coordinator implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::events::{DeliveryBroadcaster, DeliveryEvent, FleetEvent};
use crate::fleet::{Drone, FleetError, FleetStore};
use crate::flight::FlightSimulator;
use crate::orders::{OrderStatus, OrderStatusClient};

use super::types::{DispatchError, DispatchRequest, Dispatched};

/// Selects and reserves a drone for an order, then starts the flight.
///
/// Collaborators are injected at construction; the coordinator owns no
/// mutable state of its own and is cheap to share behind an `Arc`.
pub struct DispatchCoordinator {
    fleet: Arc<dyn FleetStore>,
    broadcaster: Arc<DeliveryBroadcaster>,
    orders: Arc<dyn OrderStatusClient>,
    simulator: FlightSimulator,
}

impl DispatchCoordinator {
    pub fn new(
        fleet: Arc<dyn FleetStore>,
        broadcaster: Arc<DeliveryBroadcaster>,
        orders: Arc<dyn OrderStatusClient>,
        simulator: FlightSimulator,
    ) -> Self {
        Self {
            fleet,
            broadcaster,
            orders,
            simulator,
        }
    }

    /// Start a delivery for an order.
    ///
    /// Returns synchronously once a drone is reserved and the flight task is
    /// spawned; the flight itself runs independently of the request cycle.
    pub async fn start_delivery(
        &self,
        request: DispatchRequest,
    ) -> Result<Dispatched, DispatchError> {
        validate(&request)?;

        info!(
            "Dispatch requested for order {} (branch: {:?}, drone: {:?})",
            request.order_id, request.branch_id, request.drone_id
        );

        let drone = self
            .reserve_with_retry(request.drone_id.as_deref(), &request.order_id)
            .await?;

        self.broadcaster.publish(
            &request.order_id,
            DeliveryEvent::DroneAssigned {
                order_id: request.order_id.clone(),
                drone_id: drone.name.clone(),
                message: "A drone has been assigned to your order".to_string(),
            },
        );
        self.broadcaster.publish_global(FleetEvent::DroneUpdate {
            drone: drone.clone(),
        });

        // Best-effort notification; the reservation stands even if the order
        // service is unreachable. The tracking channel already carries the
        // assignment, so the order record converging late is acceptable.
        let orders = Arc::clone(&self.orders);
        let order_id = request.order_id.clone();
        let drone_name = drone.name.clone();
        tokio::spawn(async move {
            if let Err(e) = orders
                .update_status(&order_id, OrderStatus::DroneAssigned, Some(&drone_name))
                .await
            {
                warn!("Failed to notify order service for {}: {}", order_id, e);
            }
        });

        let handle = self.simulator.start(
            &drone,
            &request.order_id,
            request.start_location,
            request.end_location,
        );

        Ok(Dispatched { drone, handle })
    }

    /// Resolve and reserve an eligible drone.
    ///
    /// A reservation can race another dispatch between resolution and the
    /// compare-and-set write; on `AlreadyReserved` the resolution is retried
    /// once before giving up.
    async fn reserve_with_retry(
        &self,
        explicit: Option<&str>,
        order_id: &str,
    ) -> Result<Drone, DispatchError> {
        for attempt in 0..2 {
            let candidate = self
                .fleet
                .find_eligible(explicit)
                .await
                .map_err(map_fleet_error)?;

            match self.fleet.reserve(&candidate.name, order_id).await {
                Ok(drone) => return Ok(drone),
                Err(FleetError::AlreadyReserved(name)) => {
                    debug!(
                        "Drone {} was taken before reservation (attempt {}), retrying",
                        name,
                        attempt + 1
                    );
                }
                Err(e) => return Err(map_fleet_error(e)),
            }
        }

        Err(DispatchError::NoDroneAvailable)
    }
}

fn validate(request: &DispatchRequest) -> Result<(), DispatchError> {
    if request.order_id.trim().is_empty() {
        return Err(DispatchError::InvalidRequest(
            "orderId is required".to_string(),
        ));
    }
    if !request.start_location.is_finite() || !request.end_location.is_finite() {
        return Err(DispatchError::InvalidRequest(
            "startLocation and endLocation must be finite coordinates".to_string(),
        ));
    }
    Ok(())
}

fn map_fleet_error(error: FleetError) -> DispatchError {
    match error {
        FleetError::LowBattery { name, battery } => DispatchError::LowBattery { name, battery },
        // A missing explicit drone and an empty pool both read as "nothing
        // available" to the caller.
        _ => DispatchError::NoDroneAvailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FleetConfig, SimulatorConfig};
    use crate::fleet::{CreateDroneRequest, DroneStatus, MemoryFleet};
    use crate::geo::Location;
    use crate::testing::MockOrderClient;

    const PALACE: Location = Location {
        lat: 10.7769,
        lng: 106.7009,
    };
    const MARKET: Location = Location {
        lat: 10.7626,
        lng: 106.6602,
    };

    struct Harness {
        fleet: Arc<MemoryFleet>,
        broadcaster: Arc<DeliveryBroadcaster>,
        orders: Arc<MockOrderClient>,
        coordinator: Arc<DispatchCoordinator>,
    }

    fn harness() -> Harness {
        let fleet = Arc::new(MemoryFleet::new(FleetConfig::default()));
        let broadcaster = Arc::new(DeliveryBroadcaster::new());
        let orders = Arc::new(MockOrderClient::new());
        let simulator = FlightSimulator::new(
            SimulatorConfig {
                tick_interval_ms: 1,
                progress_step: 0.25,
            },
            Arc::clone(&fleet) as Arc<dyn FleetStore>,
            Arc::clone(&broadcaster),
            Arc::clone(&orders) as Arc<dyn OrderStatusClient>,
        );
        let coordinator = Arc::new(DispatchCoordinator::new(
            Arc::clone(&fleet) as Arc<dyn FleetStore>,
            Arc::clone(&broadcaster),
            Arc::clone(&orders) as Arc<dyn OrderStatusClient>,
            simulator,
        ));
        Harness {
            fleet,
            broadcaster,
            orders,
            coordinator,
        }
    }

    fn request(order_id: &str, drone_id: Option<&str>) -> DispatchRequest {
        DispatchRequest {
            order_id: order_id.to_string(),
            branch_id: None,
            drone_id: drone_id.map(str::to_string),
            start_location: PALACE,
            end_location: MARKET,
        }
    }

    async fn add_drone(h: &Harness, name: &str, battery: u8) {
        h.fleet
            .create(CreateDroneRequest {
                name: name.to_string(),
                status: None,
                battery: Some(battery),
                location: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_reserves_and_announces() {
        let h = harness();
        add_drone(&h, "falcon-1", 100).await;
        let mut scope_rx = h.broadcaster.subscribe("order-1");
        let mut global_rx = h.broadcaster.subscribe_global();

        let dispatched = h.coordinator.start_delivery(request("order-1", None)).await.unwrap();
        assert_eq!(dispatched.drone.name, "falcon-1");
        assert_eq!(dispatched.drone.status, DroneStatus::Busy);

        let event = scope_rx.recv().await.unwrap();
        assert!(matches!(event, DeliveryEvent::DroneAssigned { .. }));

        let FleetEvent::DroneUpdate { drone } = global_rx.recv().await.unwrap();
        assert_eq!(drone.status, DroneStatus::Busy);

        // Let the fast trip run out so the order sync lands too.
        dispatched.handle.await_completion().await;
        let recorded = h.orders.recorded().await;
        assert!(recorded
            .iter()
            .any(|u| u.status == OrderStatus::DroneAssigned
                && u.drone_id.as_deref() == Some("falcon-1")));
        assert!(recorded.iter().any(|u| u.status == OrderStatus::Delivered));
    }

    #[tokio::test]
    async fn test_missing_order_id_rejected_without_side_effects() {
        let h = harness();
        add_drone(&h, "falcon-1", 100).await;

        let err = h.coordinator.start_delivery(request("  ", None)).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
        assert_eq!(
            h.fleet.get("falcon-1").await.unwrap().status,
            DroneStatus::Idle
        );
    }

    #[tokio::test]
    async fn test_non_finite_coordinates_rejected() {
        let h = harness();
        add_drone(&h, "falcon-1", 100).await;

        let mut bad = request("order-1", None);
        bad.end_location = Location::new(f64::NAN, 106.0);
        let err = h.coordinator.start_delivery(bad).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_explicit_low_battery_drone_rejected_untouched() {
        let h = harness();
        add_drone(&h, "weak", 15).await;
        let mut scope_rx = h.broadcaster.subscribe("order-1");
        let mut global_rx = h.broadcaster.subscribe_global();

        let err = h
            .coordinator
            .start_delivery(request("order-1", Some("weak")))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::LowBattery { battery: 15, .. }));

        // No registry mutation, no events.
        let drone = h.fleet.get("weak").await.unwrap();
        assert_eq!(drone.status, DroneStatus::Idle);
        assert!(drone.current_order_id.is_none());
        assert!(scope_rx.try_recv().is_err());
        assert!(global_rx.try_recv().is_err());
        assert!(h.orders.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_pool_rejected() {
        let h = harness();
        add_drone(&h, "weak", 10).await;

        let err = h.coordinator.start_delivery(request("order-1", None)).await.unwrap_err();
        assert!(matches!(err, DispatchError::NoDroneAvailable));
        assert!(h.orders.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_explicit_drone_reads_as_unavailable() {
        let h = harness();
        let err = h
            .coordinator
            .start_delivery(request("order-1", Some("ghost")))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NoDroneAvailable));
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_single_winner() {
        let h = harness();
        add_drone(&h, "only-one", 100).await;

        let a = {
            let coordinator = Arc::clone(&h.coordinator);
            tokio::spawn(async move { coordinator.start_delivery(request("order-a", None)).await })
        };
        let b = {
            let coordinator = Arc::clone(&h.coordinator);
            tokio::spawn(async move { coordinator.start_delivery(request("order-b", None)).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let losses = results
            .iter()
            .filter(|r| matches!(r, Err(DispatchError::NoDroneAvailable)))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(losses, 1);
    }
}
