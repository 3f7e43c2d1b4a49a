use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use skyfleet_core::{Branch, BranchError, CreateBranchRequest, Location, UpdateBranchRequest};
use tracing::info;

use super::ApiError;
use crate::state::AppState;

fn map_branch_error(err: BranchError) -> ApiError {
    match err {
        BranchError::NotFound(id) => ApiError::not_found(format!("Branch '{}' not found", id)),
        BranchError::NoBranches => ApiError::not_found("No branches registered"),
    }
}

pub async fn list_branches(State(state): State<AppState>) -> Json<Vec<Branch>> {
    Json(state.branches().list().await)
}

pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Branch>, ApiError> {
    let branch = state.branches().get(&id).await.map_err(map_branch_error)?;
    Ok(Json(branch))
}

pub async fn create_branch(
    State(state): State<AppState>,
    Json(request): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<Branch>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Branch name must not be empty"));
    }
    if !request.location.is_finite() {
        return Err(ApiError::bad_request("Branch location must be finite"));
    }
    let branch = state
        .branches()
        .create(request)
        .await
        .map_err(map_branch_error)?;
    info!(id = %branch.id, name = %branch.name, "Registered branch");
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn update_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBranchRequest>,
) -> Result<Json<Branch>, ApiError> {
    if let Some(location) = &request.location {
        if !location.is_finite() {
            return Err(ApiError::bad_request("Branch location must be finite"));
        }
    }
    let branch = state
        .branches()
        .update(&id, request)
        .await
        .map_err(map_branch_error)?;
    Ok(Json(branch))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .branches()
        .delete(&id)
        .await
        .map_err(map_branch_error)?;
    info!(id = %id, "Removed branch");
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters arrive as strings so a missing value and a malformed
/// value can be told apart and both rejected with a clear message.
#[derive(Debug, Deserialize)]
pub struct NearestParams {
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lng: Option<String>,
}

pub async fn nearest_branch(
    State(state): State<AppState>,
    Query(params): Query<NearestParams>,
) -> Result<Json<Branch>, ApiError> {
    let lat = parse_coordinate(params.lat.as_deref(), "lat")?;
    let lng = parse_coordinate(params.lng.as_deref(), "lng")?;
    let origin = Location { lat, lng };

    let branch = state
        .branches()
        .nearest(origin)
        .await
        .map_err(map_branch_error)?;
    Ok(Json(branch))
}

fn parse_coordinate(raw: Option<&str>, name: &str) -> Result<f64, ApiError> {
    let raw = raw.ok_or_else(|| {
        ApiError::bad_request(format!("Missing required query parameter '{}'", name))
    })?;
    let value: f64 = raw.parse().map_err(|_| {
        ApiError::bad_request(format!("Query parameter '{}' must be a number", name))
    })?;
    if !value.is_finite() {
        return Err(ApiError::bad_request(format!(
            "Query parameter '{}' must be finite",
            name
        )));
    }
    Ok(value)
}
