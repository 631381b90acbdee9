//! Relay Integration Tests
//!
//! Each test spawns its own gateway on a loopback port; no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use integration_tests::{wait_until, TestGateway};
use reqwest::StatusCode;
use routelink_common::AppConfig;
use serde_json::json;

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
async fn test_hello_announces_connection() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = gateway.connect().await.unwrap();

    assert!(client.connection_id.parse::<routelink_core::ConnectionId>().is_ok());
    assert_eq!(client.heartbeat_interval, 25_000);
    assert_eq!(gateway.connection_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_join_registers_presence() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = gateway.connect_as("alice").await.unwrap();

    assert_eq!(
        gateway.lookup("alice").await.unwrap(),
        Some(client.connection_id.clone())
    );
}

#[tokio::test]
async fn test_join_accepts_object_payload() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut client = gateway.connect().await.unwrap();

    client
        .send_event("join", json!({"userId": "alice"}))
        .await
        .unwrap();
    client.sync().await.unwrap();

    assert_eq!(
        gateway.lookup("alice").await.unwrap(),
        Some(client.connection_id.clone())
    );
}

// ============================================================================
// Relay Tests
// ============================================================================

#[tokio::test]
async fn test_end_to_end_message_relay() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut a = gateway.connect_as("A").await.unwrap();
    let mut b = gateway.connect_as("B").await.unwrap();

    a.send_message("A", "B", "A_B", "hi").await.unwrap();

    let frame = b.next_frame().await.unwrap();
    assert_eq!(frame["event"], "receiveMessage");
    assert_eq!(frame["data"]["senderId"], "A");
    assert_eq!(frame["data"]["message"], "hi");
    assert_eq!(frame["data"]["chatId"], "A_B");
    let timestamp = frame["data"]["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    // Exactly one delivery, and nothing echoed to the sender
    b.expect_silence().await.unwrap();
    a.expect_silence().await.unwrap();

    // B leaves; A's next message goes nowhere
    b.close().await.unwrap();
    gateway.wait_for_connection_count(1).await.unwrap();
    assert_eq!(gateway.lookup("B").await.unwrap(), None);

    a.send_message("A", "B", "A_B", "still there?").await.unwrap();
    a.sync().await.unwrap();
    assert_eq!(gateway.lookup("B").await.unwrap(), None);
    assert_eq!(
        gateway.lookup("A").await.unwrap(),
        Some(a.connection_id.clone())
    );
}

#[tokio::test]
async fn test_request_update_relay() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut driver = gateway.connect_as("driver").await.unwrap();
    let mut rider = gateway.connect_as("rider").await.unwrap();

    driver
        .request_update("rider", "req-42", "accepted")
        .await
        .unwrap();

    let frame = rider.next_frame().await.unwrap();
    assert_eq!(
        frame,
        json!({
            "event": "requestStatusChanged",
            "data": {"requestId": "req-42", "status": "accepted"}
        })
    );
    driver.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_request_update_forwards_any_status() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut driver = gateway.connect_as("driver").await.unwrap();
    let mut rider = gateway.connect_as("rider").await.unwrap();

    driver
        .request_update("rider", "req-7", "cancelled")
        .await
        .unwrap();

    let frame = rider.next_frame().await.unwrap();
    assert_eq!(frame["event"], "requestStatusChanged");
    assert_eq!(frame["data"]["status"], "cancelled");
    assert_eq!(frame["data"]["requestId"], "req-7");
}

#[tokio::test]
async fn test_message_to_offline_user_is_dropped() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut a = gateway.connect_as("A").await.unwrap();

    a.send_message("A", "nobody", "A_nobody", "hello?")
        .await
        .unwrap();

    // The sender sees no error and the connection keeps working
    a.sync().await.unwrap();
    a.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_rejoin_routes_to_newest_connection() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut a = gateway.connect_as("A").await.unwrap();
    let mut old_tab = gateway.connect_as("B").await.unwrap();
    let mut new_tab = gateway.connect_as("B").await.unwrap();

    assert_eq!(
        gateway.lookup("B").await.unwrap(),
        Some(new_tab.connection_id.clone())
    );

    a.send_message("A", "B", "A_B", "first").await.unwrap();
    let frame = new_tab.next_frame().await.unwrap();
    assert_eq!(frame["data"]["message"], "first");
    old_tab.expect_silence().await.unwrap();

    // The superseded tab closing must not take B offline
    old_tab.close().await.unwrap();
    gateway.wait_for_connection_count(2).await.unwrap();
    assert_eq!(
        gateway.lookup("B").await.unwrap(),
        Some(new_tab.connection_id.clone())
    );

    a.send_message("A", "B", "A_B", "second").await.unwrap();
    let frame = new_tab.next_frame().await.unwrap();
    assert_eq!(frame["data"]["message"], "second");
}

// ============================================================================
// Malformed Input Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let mut client = gateway.connect().await.unwrap();

    client.send_text("not json").await.unwrap();
    client.send_text(r#"{"data":"x"}"#).await.unwrap();
    client
        .send_event("teleport", json!({"to": "mars"}))
        .await
        .unwrap();
    client.send_event("join", json!({})).await.unwrap();
    client.send_event("join", json!("   ")).await.unwrap();
    client
        .send_event("sendMessage", json!({"senderId": "A", "message": "hi"}))
        .await
        .unwrap();
    client
        .send_event(
            "requestUpdate",
            json!({"receiverId": "B", "requestId": "r1", "status": ""}),
        )
        .await
        .unwrap();
    client.send_binary(vec![0xde, 0xad]).await.unwrap();

    // Still open, still answering, and nothing got registered
    client.sync().await.unwrap();
    assert!(gateway.active().await.unwrap().is_empty());

    client.join("alice").await.unwrap();
    assert_eq!(
        gateway.lookup("alice").await.unwrap(),
        Some(client.connection_id.clone())
    );
}

// ============================================================================
// Liveness Tests
// ============================================================================

fn short_timeout_config() -> AppConfig {
    let mut config = AppConfig::for_tests();
    config.relay.heartbeat_interval_ms = 50;
    config.relay.heartbeat_timeout_ms = 200;
    config
}

#[tokio::test]
async fn test_silent_connection_is_closed_with_session_timeout() {
    let gateway = TestGateway::start_with_config(short_timeout_config())
        .await
        .expect("Failed to start gateway");
    let mut client = gateway.connect_as("sleepy").await.unwrap();

    let frame = client.expect_close().await.unwrap().expect("close frame");
    assert_eq!(u16::from(frame.code), 4009);

    gateway.wait_for_connection_count(0).await.unwrap();
    assert_eq!(gateway.lookup("sleepy").await.unwrap(), None);
}

#[tokio::test]
async fn test_heartbeats_keep_connection_alive() {
    let gateway = TestGateway::start_with_config(short_timeout_config())
        .await
        .expect("Failed to start gateway");
    let mut client = gateway.connect_as("awake").await.unwrap();

    for _ in 0..8 {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        client.sync().await.unwrap();
    }

    assert_eq!(
        gateway.lookup("awake").await.unwrap(),
        Some(client.connection_id.clone())
    );
}

// ============================================================================
// Diagnostics Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let response = gateway.get("/health").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_api_health_counts_connections() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let _a = gateway.connect().await.unwrap();
    let _b = gateway.connect_as("B").await.unwrap();

    let body: serde_json::Value = gateway
        .get("/api/health")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Server is running");
    assert_eq!(body["connections"], 2);
}

#[tokio::test]
async fn test_active_listing_tracks_joins_and_leaves() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let a = gateway.connect_as("A").await.unwrap();
    let b = gateway.connect_as("B").await.unwrap();

    let body: serde_json::Value = gateway
        .get("/api/socket/active")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body,
        json!({
            "active": [["A", a.connection_id.clone()], ["B", b.connection_id.clone()]],
            "count": 2
        })
    );

    a.close().await.unwrap();
    wait_until(|| async { Ok(gateway.active().await?.len() == 1) })
        .await
        .unwrap();
    assert_eq!(gateway.lookup("A").await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let response = gateway.get("/api/messages").await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
