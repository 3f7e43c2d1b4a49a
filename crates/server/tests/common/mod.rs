//! Common test utilities for E2E testing with mocks.
//!
//! Builds an in-process server with the in-memory stores and a mock order
//! service client, so full dispatch round trips run without external
//! infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use skyfleet_core::{
    testing::MockOrderClient, BranchStore, Config, DeliveryBroadcaster, DispatchCoordinator,
    FleetStore, FlightSimulator, MemoryBranchStore, MemoryFleet, OrderStatusClient,
    SimulatorConfig,
};
use skyfleet_server::api::create_router;
use skyfleet_server::state::AppState;

/// Re-export fixtures for test convenience
pub use skyfleet_core::testing::fixtures;

/// In-process server with controllable collaborators.
///
/// Flights run with a millisecond tick and a coarse progress step so a full
/// delivery completes within a few tens of milliseconds.
pub struct TestFixture {
    pub router: Router,
    pub fleet: Arc<MemoryFleet>,
    pub branches: Arc<MemoryBranchStore>,
    pub orders: Arc<MockOrderClient>,
    pub broadcaster: Arc<DeliveryBroadcaster>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with fast flight timing.
    pub async fn new() -> Self {
        Self::with_simulator(SimulatorConfig {
            tick_interval_ms: 1,
            progress_step: 0.25,
        })
        .await
    }

    /// Create a test fixture with specific flight timing.
    pub async fn with_simulator(simulator_config: SimulatorConfig) -> Self {
        let config = Config {
            simulator: simulator_config,
            ..Config::default()
        };

        let fleet = Arc::new(MemoryFleet::new(config.fleet.clone()));
        let branches = Arc::new(MemoryBranchStore::new());
        let orders = Arc::new(MockOrderClient::new());
        let broadcaster = Arc::new(DeliveryBroadcaster::new());

        let simulator = FlightSimulator::new(
            config.simulator.clone(),
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

        let state = AppState::new(
            config,
            Arc::clone(&fleet) as Arc<dyn FleetStore>,
            Arc::clone(&branches) as Arc<dyn BranchStore>,
            Arc::clone(&broadcaster),
            coordinator,
        );
        let router = create_router(state);

        Self {
            router,
            fleet,
            branches,
            orders,
            broadcaster,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(json.to_string()))
                    .expect("Failed to build request")
            }
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
