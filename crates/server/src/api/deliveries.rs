use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use skyfleet_core::{DispatchError, DispatchRequest, Location};
use tracing::info;

use super::ApiError;
use crate::metrics::DISPATCHES_TOTAL;
use crate::state::AppState;

/// Every field optional so missing ones yield a 400 with a message rather
/// than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDeliveryBody {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    branch_id: Option<String>,
    #[serde(default)]
    drone_id: Option<String>,
    #[serde(default)]
    start_location: Option<Location>,
    #[serde(default)]
    end_location: Option<Location>,
}

fn map_dispatch_error(err: DispatchError) -> ApiError {
    match err {
        DispatchError::InvalidRequest(msg) => ApiError::bad_request(msg),
        DispatchError::LowBattery { name, battery } => ApiError::bad_request(format!(
            "Drone {} battery too low for delivery ({}%)",
            name, battery
        )),
        DispatchError::NoDroneAvailable => {
            ApiError::not_found("No drone available for delivery")
        }
    }
}

pub async fn start_delivery(
    State(state): State<AppState>,
    Json(body): Json<StartDeliveryBody>,
) -> Result<Json<Value>, ApiError> {
    let order_id = body
        .order_id
        .ok_or_else(|| ApiError::bad_request("Missing required field 'orderId'"))?;
    let start_location = body
        .start_location
        .ok_or_else(|| ApiError::bad_request("Missing required field 'startLocation'"))?;
    let end_location = body
        .end_location
        .ok_or_else(|| ApiError::bad_request("Missing required field 'endLocation'"))?;

    let request = DispatchRequest {
        order_id,
        branch_id: body.branch_id,
        drone_id: body.drone_id,
        start_location,
        end_location,
    };

    match state.coordinator().start_delivery(request).await {
        Ok(dispatched) => {
            DISPATCHES_TOTAL.with_label_values(&["accepted"]).inc();
            info!(
                order_id = %dispatched.handle.order_id,
                drone = %dispatched.drone.name,
                "Delivery started"
            );
            Ok(Json(json!({
                "message": "Delivery started",
                "drone": dispatched.drone,
            })))
        }
        Err(err) => {
            DISPATCHES_TOTAL.with_label_values(&["rejected"]).inc();
            Err(map_dispatch_error(err))
        }
    }
}
