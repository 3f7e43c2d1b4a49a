use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{branches, deliveries, drones, handlers, middleware::metrics_middleware, ws};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .route("/deliveries", post(deliveries::start_delivery))
        .route("/drones", get(drones::list_drones).post(drones::create_drone))
        .route("/drones/idle", get(drones::list_idle_drones))
        .route(
            "/drones/{name}",
            get(drones::get_drone)
                .put(drones::update_drone)
                .delete(drones::delete_drone),
        )
        .route(
            "/branches",
            get(branches::list_branches).post(branches::create_branch),
        )
        .route("/branches/nearest", get(branches::nearest_branch))
        .route(
            "/branches/{id}",
            get(branches::get_branch)
                .put(branches::update_branch)
                .delete(branches::delete_branch),
        );

    Router::new()
        .nest("/api/v1", api)
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
