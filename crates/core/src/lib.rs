pub mod branch;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod fleet;
pub mod flight;
pub mod geo;
pub mod orders;
pub mod testing;

pub use branch::{
    Branch, BranchError, BranchStore, CreateBranchRequest, MemoryBranchStore, UpdateBranchRequest,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FleetConfig,
    OrderServiceConfig, SanitizedConfig, ServerConfig, SimulatorConfig,
};
pub use dispatch::{DispatchCoordinator, DispatchError, DispatchRequest, Dispatched};
pub use events::{DeliveryBroadcaster, DeliveryEvent, FleetEvent, TripStats};
pub use fleet::{
    CreateDroneRequest, Drone, DroneStatus, FleetError, FleetStore, MemoryFleet,
    UpdateDroneRequest,
};
pub use flight::{FlightSimulator, Trip, TripHandle};
pub use geo::{haversine_km, Location};
pub use orders::{HttpOrderStatusClient, OrderClientError, OrderStatus, OrderStatusClient};
