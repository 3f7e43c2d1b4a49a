use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use skyfleet_core::DeliveryEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT,
};
use crate::state::AppState;

/// Messages a tracking client may send after connecting.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    JoinOrderRoom {
        #[serde(alias = "orderId")]
        order_id: String,
    },
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    debug!("Tracking client connected");

    // Fleet-wide updates flow from the moment of connection; per-order
    // events only after the client joins that order's room.
    let mut global_rx = state.broadcaster().subscribe_global();
    let mut order_rx: Option<broadcast::Receiver<DeliveryEvent>> = None;
    let mut joined_order: Option<String> = None;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::JoinOrderRoom { order_id }) => {
                                debug!(order_id = %order_id, "Client joined order room");
                                // Leave the previous room first so its scope
                                // can be reaped if this was the last watcher.
                                if let Some(previous) = joined_order.take() {
                                    drop(order_rx.take());
                                    state.broadcaster().prune_idle_scope(&previous);
                                }
                                order_rx = Some(state.broadcaster().subscribe(&order_id));
                                joined_order = Some(order_id);
                            }
                            Err(e) => {
                                debug!("Ignoring unrecognized client message: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
            event = global_rx.recv() => {
                match event {
                    Ok(event) => {
                        let Ok(payload) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                        WS_MESSAGES_SENT.with_label_values(&["fleet"]).inc();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        WS_LAG_EVENTS.inc();
                        warn!(skipped, "Client lagging behind fleet updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            event = recv_order_event(&mut order_rx) => {
                match event {
                    Ok(event) => {
                        let Ok(payload) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                        WS_MESSAGES_SENT.with_label_values(&["delivery"]).inc();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        WS_LAG_EVENTS.inc();
                        warn!(skipped, "Client lagging behind delivery updates");
                    }
                    Err(RecvError::Closed) => {
                        // Trip finished and its channel was pruned.
                        order_rx = None;
                        joined_order = None;
                    }
                }
            }
        }
    }

    drop(order_rx);
    if let Some(order_id) = joined_order {
        state.broadcaster().prune_idle_scope(&order_id);
    }

    WS_CONNECTIONS_ACTIVE.dec();
    debug!("Tracking client disconnected");
}

/// Pends forever while no order room has been joined so it never wins the
/// select race.
async fn recv_order_event(
    rx: &mut Option<broadcast::Receiver<DeliveryEvent>>,
) -> Result<DeliveryEvent, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
