//! In-memory fleet store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::FleetConfig;
use crate::geo::Location;

use super::store::FleetStore;
use super::types::{CreateDroneRequest, Drone, DroneStatus, FleetError, UpdateDroneRequest};

/// Depot position new drones start from when none is given.
const DEFAULT_LOCATION: Location = Location {
    lat: 10.7769,
    lng: 106.7009,
};

/// In-memory implementation of [`FleetStore`].
///
/// The whole registry sits behind one `RwLock`; `reserve` holds the write
/// lock across its check-then-set, which gives the compare-and-set semantics
/// the trait requires without per-drone locks.
pub struct MemoryFleet {
    config: FleetConfig,
    drones: RwLock<HashMap<String, Drone>>,
}

impl MemoryFleet {
    pub fn new(config: FleetConfig) -> Self {
        Self {
            config,
            drones: RwLock::new(HashMap::new()),
        }
    }

    fn eligible(&self, drone: &Drone) -> bool {
        drone.status == DroneStatus::Idle && drone.battery > self.config.low_battery_threshold
    }
}

#[async_trait]
impl FleetStore for MemoryFleet {
    async fn find_eligible(&self, explicit: Option<&str>) -> Result<Drone, FleetError> {
        let drones = self.drones.read().await;

        if let Some(name) = explicit {
            let drone = drones
                .get(name)
                .ok_or(FleetError::NoneAvailable)?;
            if drone.battery <= self.config.low_battery_threshold {
                return Err(FleetError::LowBattery {
                    name: drone.name.clone(),
                    battery: drone.battery,
                });
            }
            return Ok(drone.clone());
        }

        // Stable name order keeps candidate selection deterministic across
        // repeated calls against the same fleet.
        let mut candidates: Vec<&Drone> = drones.values().filter(|d| self.eligible(d)).collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        candidates
            .first()
            .map(|d| (*d).clone())
            .ok_or(FleetError::NoneAvailable)
    }

    async fn reserve(&self, name: &str, order_id: &str) -> Result<Drone, FleetError> {
        let mut drones = self.drones.write().await;

        let drone = drones
            .get_mut(name)
            .ok_or_else(|| FleetError::NotFound(name.to_string()))?;

        // Check and set under the same write lock; a concurrent reservation
        // observes Busy here and fails instead of double-booking.
        if drone.status != DroneStatus::Idle {
            return Err(FleetError::AlreadyReserved(name.to_string()));
        }

        drone.status = DroneStatus::Busy;
        drone.current_order_id = Some(order_id.to_string());
        drone.updated_at = Utc::now();

        debug!("Reserved drone {} for order {}", name, order_id);
        Ok(drone.clone())
    }

    async fn release(&self, name: &str) -> Result<Drone, FleetError> {
        let mut drones = self.drones.write().await;

        let drone = drones
            .get_mut(name)
            .ok_or_else(|| FleetError::NotFound(name.to_string()))?;

        if drone.status != DroneStatus::Busy {
            warn!(
                "Release requested for drone {} in state {}, ignoring",
                name,
                drone.status.as_str()
            );
            return Ok(drone.clone());
        }

        drone.status = DroneStatus::Idle;
        drone.current_order_id = None;
        drone.battery = drone.battery.saturating_sub(self.config.trip_battery_cost);
        drone.updated_at = Utc::now();

        info!(
            "Drone {} released, battery at {}%",
            drone.name, drone.battery
        );
        Ok(drone.clone())
    }

    async fn update_position(&self, name: &str, location: Location) -> Result<(), FleetError> {
        let mut drones = self.drones.write().await;

        let drone = drones
            .get_mut(name)
            .ok_or_else(|| FleetError::NotFound(name.to_string()))?;

        drone.current_location = location;
        drone.updated_at = Utc::now();
        Ok(())
    }

    async fn create(&self, request: CreateDroneRequest) -> Result<Drone, FleetError> {
        let mut drones = self.drones.write().await;

        if drones.contains_key(&request.name) {
            return Err(FleetError::DuplicateName(request.name));
        }

        let status = request.status.unwrap_or(DroneStatus::Idle);
        let now = Utc::now();
        let drone = Drone {
            name: request.name.clone(),
            status,
            battery: request.battery.unwrap_or(100).min(100),
            current_order_id: None,
            current_location: request.location.unwrap_or(DEFAULT_LOCATION),
            created_at: now,
            updated_at: now,
        };

        drones.insert(drone.name.clone(), drone.clone());
        info!("Registered drone {}", drone.name);
        Ok(drone)
    }

    async fn get(&self, name: &str) -> Result<Drone, FleetError> {
        self.drones
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| FleetError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Vec<Drone> {
        let mut all: Vec<Drone> = self.drones.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    async fn list_idle(&self) -> Vec<Drone> {
        let mut idle: Vec<Drone> = self
            .drones
            .read()
            .await
            .values()
            .filter(|d| d.status == DroneStatus::Idle)
            .cloned()
            .collect();
        idle.sort_by(|a, b| a.name.cmp(&b.name));
        idle
    }

    async fn update(&self, name: &str, request: UpdateDroneRequest) -> Result<Drone, FleetError> {
        let mut drones = self.drones.write().await;

        let drone = drones
            .get_mut(name)
            .ok_or_else(|| FleetError::NotFound(name.to_string()))?;

        if let Some(status) = request.status {
            // Administration cannot move a drone out of Busy; only the
            // flight task releases an active delivery.
            if drone.status == DroneStatus::Busy && status != DroneStatus::Busy {
                return Err(FleetError::Busy(name.to_string()));
            }
            drone.status = status;
        }
        if let Some(battery) = request.battery {
            drone.battery = battery.min(100);
        }
        if let Some(location) = request.location {
            drone.current_location = location;
        }
        drone.updated_at = Utc::now();

        Ok(drone.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), FleetError> {
        let mut drones = self.drones.write().await;

        let drone = drones
            .get(name)
            .ok_or_else(|| FleetError::NotFound(name.to_string()))?;

        if drone.status == DroneStatus::Busy {
            return Err(FleetError::Busy(name.to_string()));
        }

        drones.remove(name);
        info!("Removed drone {}", name);
        Ok(())
    }
}
