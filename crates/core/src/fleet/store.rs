//! Fleet storage trait.

use async_trait::async_trait;

use crate::geo::Location;

use super::types::{CreateDroneRequest, Drone, FleetError, UpdateDroneRequest};

/// Authoritative store of drone state.
///
/// `reserve` is the single point of truth for assignment: implementations
/// must provide compare-and-set semantics so that two concurrent dispatch
/// requests can never both reserve the same drone.
#[async_trait]
pub trait FleetStore: Send + Sync {
    /// Find a drone eligible for assignment.
    ///
    /// With an explicit name, fetches that drone and fails with
    /// [`FleetError::LowBattery`] when its battery is at or below the
    /// threshold. Without one, returns any idle drone above the battery
    /// threshold, or [`FleetError::NoneAvailable`].
    async fn find_eligible(&self, explicit: Option<&str>) -> Result<Drone, FleetError>;

    /// Atomically transition an idle drone to busy for the given order.
    ///
    /// Fails with [`FleetError::AlreadyReserved`] if the drone is not idle at
    /// the time of the write.
    async fn reserve(&self, name: &str, order_id: &str) -> Result<Drone, FleetError>;

    /// Return a drone to idle, clear its order, and debit its battery.
    ///
    /// Releasing a drone that is not busy is a logged no-op: the flight task
    /// must always be able to terminate cleanly.
    async fn release(&self, name: &str) -> Result<Drone, FleetError>;

    /// Location-only write, no status change.
    async fn update_position(&self, name: &str, location: Location) -> Result<(), FleetError>;

    // Administration CRUD.

    async fn create(&self, request: CreateDroneRequest) -> Result<Drone, FleetError>;

    async fn get(&self, name: &str) -> Result<Drone, FleetError>;

    async fn list(&self) -> Vec<Drone>;

    /// Idle drones only, regardless of battery level.
    async fn list_idle(&self) -> Vec<Drone>;

    async fn update(&self, name: &str, request: UpdateDroneRequest) -> Result<Drone, FleetError>;

    /// Remove a drone. Fails with [`FleetError::Busy`] while the drone has an
    /// active delivery; a drone is never destroyed mid-trip.
    async fn delete(&self, name: &str) -> Result<(), FleetError>;
}
