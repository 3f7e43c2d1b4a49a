//! Delivery lifecycle integration tests.
//!
//! These tests verify the complete trip lifecycle through the dispatch
//! coordinator: request -> reservation -> assignment events -> in-flight
//! progress -> delivery -> drone release and order sync.

use std::sync::Arc;

use skyfleet_core::{
    testing::{fixtures, MockOrderClient},
    DeliveryBroadcaster, DeliveryEvent, DispatchCoordinator, DispatchError, DispatchRequest,
    DroneStatus, FleetConfig, FleetEvent, FleetStore, FlightSimulator, MemoryFleet, OrderStatus,
    OrderStatusClient, SimulatorConfig,
};

/// Test helper wiring the full dispatch stack with a fast simulator clock.
struct TestHarness {
    fleet: Arc<MemoryFleet>,
    broadcaster: Arc<DeliveryBroadcaster>,
    orders: Arc<MockOrderClient>,
    coordinator: DispatchCoordinator,
}

impl TestHarness {
    fn new(progress_step: f64) -> Self {
        let fleet = Arc::new(MemoryFleet::new(FleetConfig::default()));
        let broadcaster = Arc::new(DeliveryBroadcaster::new());
        let orders = Arc::new(MockOrderClient::new());

        let simulator = FlightSimulator::new(
            SimulatorConfig {
                tick_interval_ms: 1,
                progress_step,
            },
            Arc::clone(&fleet) as Arc<dyn FleetStore>,
            Arc::clone(&broadcaster),
            Arc::clone(&orders) as Arc<dyn OrderStatusClient>,
        );
        let coordinator = DispatchCoordinator::new(
            Arc::clone(&fleet) as Arc<dyn FleetStore>,
            Arc::clone(&broadcaster),
            Arc::clone(&orders) as Arc<dyn OrderStatusClient>,
            simulator,
        );

        Self {
            fleet,
            broadcaster,
            orders,
            coordinator,
        }
    }

    fn request(&self, order_id: &str) -> DispatchRequest {
        DispatchRequest {
            order_id: order_id.to_string(),
            branch_id: None,
            drone_id: None,
            start_location: fixtures::RESTAURANT,
            end_location: fixtures::CUSTOMER,
        }
    }
}

#[tokio::test]
async fn test_complete_delivery_lifecycle() {
    let harness = TestHarness::new(0.05);
    harness.fleet.create(fixtures::drone("falcon-1", 100)).await.unwrap();

    let mut scope_rx = harness.broadcaster.subscribe("order-1");
    let mut global_rx = harness.broadcaster.subscribe_global();

    let dispatched = harness
        .coordinator
        .start_delivery(harness.request("order-1"))
        .await
        .expect("dispatch should succeed");

    assert_eq!(dispatched.drone.name, "falcon-1");
    assert_eq!(dispatched.drone.status, DroneStatus::Busy);
    assert_eq!(dispatched.drone.current_order_id.as_deref(), Some("order-1"));

    // Collect the full scoped event stream for this order.
    let mut events = Vec::new();
    loop {
        let event = scope_rx.recv().await.expect("scope channel open");
        let terminal = matches!(event, DeliveryEvent::Delivered { .. });
        events.push(event);
        if terminal {
            break;
        }
    }
    dispatched.handle.await_completion().await;

    // Assignment first, 19 progress updates, one terminal event.
    assert_eq!(events.len(), 21);
    assert!(matches!(events[0], DeliveryEvent::DroneAssigned { .. }));
    assert!(events[1..20]
        .iter()
        .all(|e| matches!(e, DeliveryEvent::Delivering { .. })));

    let progresses: Vec<f64> = events[1..].iter().map(DeliveryEvent::progress).collect();
    assert!(progresses.windows(2).all(|w| w[1] >= w[0]), "progress must be non-decreasing");
    assert_eq!(*progresses.last().unwrap(), 1.0);

    match events.last().unwrap() {
        DeliveryEvent::Delivered { progress, stats, .. } => {
            assert_eq!(*progress, 1.0);
            assert_eq!(stats.remaining, "0.00 km");
        }
        other => panic!("expected Delivered, got {:?}", other),
    }

    // Fleet-wide notifications: busy on assignment, idle on release.
    let FleetEvent::DroneUpdate { drone } = global_rx.recv().await.unwrap();
    assert_eq!(drone.status, DroneStatus::Busy);
    let FleetEvent::DroneUpdate { drone } = global_rx.recv().await.unwrap();
    assert_eq!(drone.status, DroneStatus::Idle);
    assert_eq!(drone.battery, 90);

    // Both milestones reached the order service.
    let recorded = harness.orders.recorded().await;
    let statuses: Vec<OrderStatus> = recorded.iter().map(|u| u.status).collect();
    assert!(statuses.contains(&OrderStatus::DroneAssigned));
    assert!(statuses.contains(&OrderStatus::Delivered));

    // Registry invariant after the full lifecycle.
    let drone = harness.fleet.get("falcon-1").await.unwrap();
    assert!(drone.invariant_holds());
    assert_eq!(drone.status, DroneStatus::Idle);
}

#[tokio::test]
async fn test_sequential_trips_drain_battery() {
    let harness = TestHarness::new(0.5);
    harness.fleet.create(fixtures::drone("falcon-1", 100)).await.unwrap();

    for i in 0..3 {
        let dispatched = harness
            .coordinator
            .start_delivery(harness.request(&format!("order-{}", i)))
            .await
            .unwrap();
        dispatched.handle.await_completion().await;
    }

    let drone = harness.fleet.get("falcon-1").await.unwrap();
    assert_eq!(drone.battery, 70);
    assert_eq!(drone.status, DroneStatus::Idle);
}

#[tokio::test]
async fn test_fleet_exhaustion_after_battery_drain() {
    let harness = TestHarness::new(0.5);
    // 25% battery: one trip leaves it at 15%, below the assignment floor.
    harness.fleet.create(fixtures::drone("falcon-1", 25)).await.unwrap();

    let dispatched = harness
        .coordinator
        .start_delivery(harness.request("order-1"))
        .await
        .unwrap();
    dispatched.handle.await_completion().await;

    let err = harness
        .coordinator
        .start_delivery(harness.request("order-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoDroneAvailable));
}

#[tokio::test]
async fn test_two_orders_two_drones_isolated_scopes() {
    let harness = TestHarness::new(0.25);
    harness.fleet.create(fixtures::drone("alpha", 100)).await.unwrap();
    harness.fleet.create(fixtures::drone("bravo", 100)).await.unwrap();

    let mut rx_a = harness.broadcaster.subscribe("order-a");
    let mut rx_b = harness.broadcaster.subscribe("order-b");

    let first = harness
        .coordinator
        .start_delivery(harness.request("order-a"))
        .await
        .unwrap();
    let second = harness
        .coordinator
        .start_delivery(harness.request("order-b"))
        .await
        .unwrap();

    // Stable selection order: alpha reserved first, bravo second.
    assert_eq!(first.drone.name, "alpha");
    assert_eq!(second.drone.name, "bravo");

    first.handle.await_completion().await;
    second.handle.await_completion().await;

    // Every event in a scope belongs to that scope's order.
    while let Ok(event) = rx_a.try_recv() {
        assert_eq!(event.order_id(), "order-a");
    }
    while let Ok(event) = rx_b.try_recv() {
        assert_eq!(event.order_id(), "order-b");
    }

    // Both drones are back and debited once each.
    for name in ["alpha", "bravo"] {
        let drone = harness.fleet.get(name).await.unwrap();
        assert_eq!(drone.status, DroneStatus::Idle);
        assert_eq!(drone.battery, 90);
    }
}

#[tokio::test]
async fn test_order_service_outage_does_not_block_delivery() {
    let harness = TestHarness::new(0.5);
    harness.fleet.create(fixtures::drone("falcon-1", 100)).await.unwrap();

    // The assignment notification fails; dispatch and flight proceed anyway.
    harness.orders.fail_next().await;

    let dispatched = harness
        .coordinator
        .start_delivery(harness.request("order-1"))
        .await
        .expect("dispatch survives order-service outage");
    dispatched.handle.await_completion().await;

    let drone = harness.fleet.get("falcon-1").await.unwrap();
    assert_eq!(drone.status, DroneStatus::Idle);
    assert_eq!(drone.battery, 90);
}
