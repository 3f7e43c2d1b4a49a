use std::sync::Arc;

use skyfleet_core::{
    BranchStore, Config, DeliveryBroadcaster, DispatchCoordinator, FleetStore, SanitizedConfig,
};

/// Shared handles behind every request handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    fleet: Arc<dyn FleetStore>,
    branches: Arc<dyn BranchStore>,
    broadcaster: Arc<DeliveryBroadcaster>,
    coordinator: Arc<DispatchCoordinator>,
}

impl AppState {
    pub fn new(
        config: Config,
        fleet: Arc<dyn FleetStore>,
        branches: Arc<dyn BranchStore>,
        broadcaster: Arc<DeliveryBroadcaster>,
        coordinator: Arc<DispatchCoordinator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fleet,
            branches,
            broadcaster,
            coordinator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(self.config.as_ref())
    }

    pub fn fleet(&self) -> &Arc<dyn FleetStore> {
        &self.fleet
    }

    pub fn branches(&self) -> &Arc<dyn BranchStore> {
        &self.branches
    }

    pub fn broadcaster(&self) -> &Arc<DeliveryBroadcaster> {
        &self.broadcaster
    }

    pub fn coordinator(&self) -> &Arc<DispatchCoordinator> {
        &self.coordinator
    }
}
