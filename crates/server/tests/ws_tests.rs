//! Live-socket tests for the tracking endpoint.
//!
//! These bind a real listener instead of driving the router with `oneshot`,
//! since the websocket upgrade needs an actual connection.

mod common;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use skyfleet_core::{DeliveryEvent, Location, TripStats};

use common::TestFixture;

async fn serve_fixture(fixture: &TestFixture) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let router = fixture.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });
    addr
}

fn delivering(order_id: &str) -> DeliveryEvent {
    DeliveryEvent::Delivering {
        order_id: order_id.to_string(),
        drone_id: "falcon-1".to_string(),
        location: Location::new(10.77, 106.69),
        progress: 0.25,
        stats: TripStats::from_km(4.72, 1.18, 3.54),
        message: "Drone falcon-1 is delivering order".to_string(),
    }
}

#[tokio::test]
async fn test_join_order_room_receives_delivery_frames() {
    let fixture = TestFixture::new().await;
    let addr = serve_fixture(&fixture).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");
    ws.send(Message::Text(
        serde_json::json!({ "type": "join_order_room", "orderId": "order-77" })
            .to_string()
            .into(),
    ))
    .await
    .expect("Failed to send join");

    // The join is processed asynchronously and events are never replayed,
    // so publish until a frame comes through.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let frame = loop {
        assert!(
            tokio::time::Instant::now() < deadline,
            "No delivery frame received"
        );
        fixture.broadcaster.publish("order-77", delivering("order-77"));
        match tokio::time::timeout(Duration::from_millis(50), ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => break text,
            _ => {}
        }
    };

    let value: serde_json::Value =
        serde_json::from_str(&frame).expect("Frame was not valid JSON");
    assert_eq!(value["status"], "DELIVERING");
    assert_eq!(value["orderId"], "order-77");
    assert_eq!(value["droneId"], "falcon-1");
    assert_eq!(value["stats"]["total"], "4.72 km");
}

#[tokio::test]
async fn test_disconnect_reaps_unwatched_order_scope() {
    let fixture = TestFixture::new().await;
    let addr = serve_fixture(&fixture).await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");
    ws.send(Message::Text(
        serde_json::json!({ "type": "join_order_room", "orderId": "no-such-order" })
            .to_string()
            .into(),
    ))
    .await
    .expect("Failed to send join");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while fixture.broadcaster.scope_count() != 1 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Join was never processed"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // The order never dispatches, so only the disconnect can free the scope.
    ws.close(None).await.expect("Failed to close");
    drop(ws);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while fixture.broadcaster.scope_count() != 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Abandoned order scope was never reaped"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
