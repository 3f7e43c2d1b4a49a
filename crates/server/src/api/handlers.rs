use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::metrics::collect_and_encode;
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.sanitized_config()))
}

pub async fn metrics(State(state): State<AppState>) -> String {
    collect_and_encode(&state).await
}
