use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::state::AppState;

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyfleet_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "skyfleet_http_request_duration_seconds",
            "HTTP request latency",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["method", "path"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "skyfleet_http_requests_in_flight",
        "HTTP requests currently being served",
    )
    .unwrap()
});

pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "skyfleet_ws_connections_active",
        "WebSocket connections currently open",
    )
    .unwrap()
});

pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "skyfleet_ws_connections_total",
        "WebSocket connections accepted since start",
    )
    .unwrap()
});

pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "skyfleet_ws_messages_sent_total",
            "WebSocket messages pushed to clients",
        ),
        &["kind"],
    )
    .unwrap()
});

pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "skyfleet_ws_lag_events_total",
        "Broadcast messages dropped because a client fell behind",
    )
    .unwrap()
});

pub static DISPATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyfleet_dispatches_total", "Delivery dispatch attempts"),
        &["outcome"],
    )
    .unwrap()
});

pub static TRACKING_SCOPES_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "skyfleet_tracking_scopes_active",
        "Order tracking channels currently alive",
    )
    .unwrap()
});

pub static DRONES_IDLE: Lazy<Gauge> = Lazy::new(|| {
    Gauge::new("skyfleet_drones_idle", "Drones currently idle").unwrap()
});

pub fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(WS_MESSAGES_SENT.clone())).unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();
    registry.register(Box::new(DISPATCHES_TOTAL.clone())).unwrap();
    registry
        .register(Box::new(TRACKING_SCOPES_ACTIVE.clone()))
        .unwrap();
    registry.register(Box::new(DRONES_IDLE.clone())).unwrap();
}

/// Refresh gauges that mirror live state, then render the registry.
pub async fn collect_and_encode(state: &AppState) -> String {
    TRACKING_SCOPES_ACTIVE.set(state.broadcaster().scope_count() as i64);
    DRONES_IDLE.set(state.fleet().list_idle().await.len() as f64);
    encode_metrics()
}

pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collapse resource identifiers so label cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut out: Vec<String> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let parent = if i > 0 { segments[i - 1] } else { "" };
        let normalized = match parent {
            "drones" if !segment.is_empty() && *segment != "idle" => "{name}".to_string(),
            "branches" if !segment.is_empty() && *segment != "nearest" => "{id}".to_string(),
            _ => (*segment).to_string(),
        };
        out.push(normalized);
    }
    out.join("/")
}
