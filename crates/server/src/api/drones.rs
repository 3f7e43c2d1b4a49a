use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use skyfleet_core::{CreateDroneRequest, Drone, FleetError, UpdateDroneRequest};
use tracing::info;

use super::ApiError;
use crate::state::AppState;

fn map_fleet_error(err: FleetError) -> ApiError {
    match err {
        FleetError::NotFound(name) => ApiError::not_found(format!("Drone '{}' not found", name)),
        FleetError::DuplicateName(name) => {
            ApiError::bad_request(format!("Drone '{}' already exists", name))
        }
        FleetError::Busy(name) => {
            ApiError::conflict(format!("Drone '{}' is currently on a delivery", name))
        }
        other => ApiError::internal(other.to_string()),
    }
}

pub async fn list_drones(State(state): State<AppState>) -> Json<Vec<Drone>> {
    Json(state.fleet().list().await)
}

pub async fn list_idle_drones(State(state): State<AppState>) -> Json<Vec<Drone>> {
    Json(state.fleet().list_idle().await)
}

pub async fn get_drone(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Drone>, ApiError> {
    let drone = state.fleet().get(&name).await.map_err(map_fleet_error)?;
    Ok(Json(drone))
}

pub async fn create_drone(
    State(state): State<AppState>,
    Json(request): Json<CreateDroneRequest>,
) -> Result<(StatusCode, Json<Drone>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Drone name must not be empty"));
    }
    let drone = state
        .fleet()
        .create(request)
        .await
        .map_err(map_fleet_error)?;
    info!(name = %drone.name, "Registered drone");
    Ok((StatusCode::CREATED, Json(drone)))
}

pub async fn update_drone(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<UpdateDroneRequest>,
) -> Result<Json<Drone>, ApiError> {
    let drone = state
        .fleet()
        .update(&name, request)
        .await
        .map_err(map_fleet_error)?;
    Ok(Json(drone))
}

pub async fn delete_drone(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.fleet().delete(&name).await.map_err(map_fleet_error)?;
    info!(name = %name, "Removed drone");
    Ok(StatusCode::NO_CONTENT)
}
