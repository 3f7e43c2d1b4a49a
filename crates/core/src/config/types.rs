use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub order_service: OrderServiceConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    3005
}

/// Fleet registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FleetConfig {
    /// Drones at or below this battery percentage are not assignable.
    #[serde(default = "default_low_battery_threshold")]
    pub low_battery_threshold: u8,
    /// Battery percentage points debited per completed trip.
    #[serde(default = "default_trip_battery_cost")]
    pub trip_battery_cost: u8,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            low_battery_threshold: default_low_battery_threshold(),
            trip_battery_cost: default_trip_battery_cost(),
        }
    }
}

fn default_low_battery_threshold() -> u8 {
    20
}

fn default_trip_battery_cost() -> u8 {
    10
}

/// Flight simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Period between position updates in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Progress fraction advanced per tick, in (0, 1].
    #[serde(default = "default_progress_step")]
    pub progress_step: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            progress_step: default_progress_step(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_progress_step() -> f64 {
    0.05
}

/// Order service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderServiceConfig {
    /// Base URL of the order service's internal status endpoint.
    #[serde(default = "default_order_service_url")]
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_order_timeout")]
    pub timeout_secs: u32,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            url: default_order_service_url(),
            timeout_secs: default_order_timeout(),
        }
    }
}

fn default_order_service_url() -> String {
    "http://localhost:3003".to_string()
}

fn default_order_timeout() -> u32 {
    10
}

/// Sanitized config for API responses.
///
/// Nothing here is secret today, but the boundary stays: internal service
/// URLs are not echoed back to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub fleet: FleetConfig,
    pub simulator: SimulatorConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            fleet: config.fleet.clone(),
            simulator: config.simulator.clone(),
        }
    }
}
