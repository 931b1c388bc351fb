//! End-to-end relay tests
//!
//! Exercise the full path: framed client channel -> session state machine ->
//! backend channel, and backend frame -> dispatcher -> framed client channel.
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use integration_tests::{wait_for, TestHub};
use relay_core::{HubRoute, PeerRoute};
use serde_json::json;
use tokio::time::{timeout, Duration};
use tokio_util::bytes::Bytes;

// ============================================================================
// Client -> backend
// ============================================================================

#[tokio::test]
async fn test_connect_then_relay_reaches_backend() {
    let mut hub = TestHub::<HubRoute>::start();
    let mut client = hub.client("c1");

    client
        .send(&json!({"type": "connect", "hostId": "h1"}))
        .await
        .unwrap();
    client
        .send(&json!({"type": "message", "message": {"n": 1}}))
        .await
        .unwrap();

    assert_eq!(
        hub.backend_recv().await.unwrap(),
        json!({"extensionId": "c1", "hostId": "h1", "message": {"n": 1}})
    );

    // Fire-and-forget: no acknowledgement on the client channel
    client.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_message_before_connect_is_rejected() {
    let mut hub = TestHub::<HubRoute>::start();
    let mut client = hub.client("c1");

    client
        .send(&json!({"type": "message", "message": {"n": 1}}))
        .await
        .unwrap();

    assert_eq!(
        client.recv().await.unwrap(),
        json!({
            "type": "response",
            "response": {"successful": false, "reason": "use connect first"}
        })
    );
    hub.backend_silent().await.unwrap();
}

#[tokio::test]
async fn test_relay_with_empty_payload_is_rejected() {
    let mut hub = TestHub::<HubRoute>::start();
    let mut client = hub.client("c1");

    client
        .send(&json!({"type": "connect", "hostId": "h1"}))
        .await
        .unwrap();
    client
        .send(&json!({"type": "message", "message": ""}))
        .await
        .unwrap();

    assert_eq!(
        client.recv().await.unwrap(),
        json!({
            "type": "response",
            "response": {"successful": false, "reason": "no message field in messsage"}
        })
    );
    hub.backend_silent().await.unwrap();
}

// ============================================================================
// Backend -> client
// ============================================================================

#[tokio::test]
async fn test_backend_reply_is_routed_to_owning_client() {
    let mut hub = TestHub::<HubRoute>::start();
    let mut first = hub.client("c1");
    let mut second = hub.client("c2");

    first
        .send(&json!({"type": "connect", "hostId": "h1"}))
        .await
        .unwrap();
    second
        .send(&json!({"type": "connect", "hostId": "h2"}))
        .await
        .unwrap();

    let state = hub.state().clone();
    wait_for(|| {
        state.registry().contains(&HubRoute::new("c1", "h1"))
            && state.registry().contains(&HubRoute::new("c2", "h2"))
    })
    .await
    .unwrap();

    hub.backend_send(&json!({"extensionId": "c1", "hostId": "h1", "message": {"n": 1}}))
        .await
        .unwrap();

    assert_eq!(
        first.recv().await.unwrap(),
        json!({"type": "message", "message": {"n": 1}})
    );
    second.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_unroutable_backend_message_is_dropped() {
    let mut hub = TestHub::<HubRoute>::start();
    let mut client = hub.client("c1");

    client
        .send(&json!({"type": "connect", "hostId": "h1"}))
        .await
        .unwrap();
    let state = hub.state().clone();
    wait_for(|| state.registry().contains(&HubRoute::new("c1", "h1")))
        .await
        .unwrap();

    // Nobody owns this key; the frame is silently discarded
    hub.backend_send(&json!({"extensionId": "zzz", "hostId": "nope", "message": 1}))
        .await
        .unwrap();
    client.expect_silence().await.unwrap();

    // Routing is unaffected afterwards
    hub.backend_send(&json!({"extensionId": "c1", "hostId": "h1", "message": 2}))
        .await
        .unwrap();
    assert_eq!(
        client.recv().await.unwrap(),
        json!({"type": "message", "message": 2})
    );
}

#[tokio::test]
async fn test_disconnect_removes_route() {
    let mut hub = TestHub::<HubRoute>::start();
    let mut client = hub.client("c1");

    client
        .send(&json!({"type": "connect", "hostId": "h1"}))
        .await
        .unwrap();
    let state = hub.state().clone();
    wait_for(|| state.registry().contains(&HubRoute::new("c1", "h1")))
        .await
        .unwrap();

    drop(client);
    wait_for(|| state.registry().is_empty()).await.unwrap();

    // Backend frames for the departed client are dropped without fallout
    hub.backend_send(&json!({"extensionId": "c1", "hostId": "h1", "message": 1}))
        .await
        .unwrap();

    let mut other = hub.client("c2");
    other
        .send(&json!({"type": "connect", "hostId": "h2"}))
        .await
        .unwrap();
    other
        .send(&json!({"type": "message", "message": "still alive"}))
        .await
        .unwrap();
    assert_eq!(
        hub.backend_recv().await.unwrap(),
        json!({"extensionId": "c2", "hostId": "h2", "message": "still alive"})
    );
}

// ============================================================================
// Transport-level failures
// ============================================================================

#[tokio::test]
async fn test_oversized_client_frame_is_rejected() {
    let mut config = relay_common::RelayConfig::default();
    config.transport.max_frame_len = 64;

    let hub = TestHub::<HubRoute>::start_with_config(config);
    let mut client = hub.client("c1");

    client
        .send_raw(Bytes::from(vec![b'x'; 1024]))
        .await
        .unwrap();

    // The reply names the offending frame's length, not the limit
    let reply = client.recv().await.unwrap();
    assert_eq!(reply["code"], 1);
    assert_eq!(reply["error"], "invalid message length: 1024");
}

#[tokio::test]
async fn test_undecodable_client_frame_is_rejected() {
    let hub = TestHub::<HubRoute>::start();
    let mut client = hub.client("c1");

    client.send_raw(Bytes::from_static(b"not json")).await.unwrap();

    let reply = client.recv().await.unwrap();
    assert_eq!(reply["code"], 3);
    assert!(reply["error"].is_string());
}

// ============================================================================
// Single-level addressing
// ============================================================================

#[tokio::test]
async fn test_single_level_client_relays_verbatim() {
    let mut hub = TestHub::<PeerRoute>::start();
    let mut client = hub.client("ext1");

    let state = hub.state().clone();
    wait_for(|| state.registry().contains(&PeerRoute::new("ext1")))
        .await
        .unwrap();

    // No connect/message protocol: frames pass through as-is
    client.send(&json!({"anything": true})).await.unwrap();
    assert_eq!(
        hub.backend_recv().await.unwrap(),
        json!({"extensionId": "ext1", "message": {"anything": true}})
    );

    // Replies are delivered raw, without a protocol wrapper
    hub.backend_send(&json!({"extensionId": "ext1", "message": {"pong": 2}}))
        .await
        .unwrap();
    assert_eq!(client.recv().await.unwrap(), json!({"pong": 2}));
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_backend_eof_stops_dispatcher() {
    let hub = TestHub::<HubRoute>::start();
    let dispatcher = hub.close_backend();

    timeout(Duration::from_secs(1), dispatcher)
        .await
        .expect("dispatcher did not stop on backend EOF")
        .unwrap();
}
