use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Battery values are percentages
/// - Simulator step and tick interval are in range
/// - Order service URL is present
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.fleet.low_battery_threshold > 100 {
        return Err(ConfigError::ValidationError(
            "fleet.low_battery_threshold must be a percentage (0-100)".to_string(),
        ));
    }

    if config.fleet.trip_battery_cost > 100 {
        return Err(ConfigError::ValidationError(
            "fleet.trip_battery_cost must be a percentage (0-100)".to_string(),
        ));
    }

    if config.simulator.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "simulator.tick_interval_ms cannot be 0".to_string(),
        ));
    }

    if !(config.simulator.progress_step > 0.0 && config.simulator.progress_step <= 1.0) {
        return Err(ConfigError::ValidationError(
            "simulator.progress_step must be in (0, 1]".to_string(),
        ));
    }

    if config.order_service.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "order_service.url cannot be empty".to_string(),
        ));
    }

    Ok(())
}
