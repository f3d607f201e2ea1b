//! End-to-end tests: two full clients through a live relay.
//!
//! Covers the canonical session flow (connect both, exchange keys, chat in
//! both directions) plus failure behavior: a garbage frame injected by a
//! third connection must be discarded without killing the channel, and a
//! malformed handshake frame must abort establishment.

use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use hushwire_core::ChannelError;
use hushwire_transport::{SecureChat, TransportConfig, TransportError};

async fn start_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(hushwire_server::run_server(listener));
    format!("ws://{}", addr)
}

fn dev_config(url: &str) -> TransportConfig {
    TransportConfig::new(url).with_insecure_dev()
}

/// Connect both endpoints before either starts the key exchange, so
/// neither handshake frame is broadcast into an empty relay.
async fn establish_pair(url: &str) -> (SecureChat, SecureChat) {
    let pending_a = SecureChat::connect(dev_config(url)).await.expect("connect a");
    let pending_b = SecureChat::connect(dev_config(url)).await.expect("connect b");
    sleep(Duration::from_millis(50)).await;

    let (a, b) = tokio::join!(pending_a.establish(), pending_b.establish());
    (a.expect("establish a"), b.expect("establish b"))
}

#[tokio::test]
async fn test_full_session_e2e() {
    let url = start_relay().await;
    let (mut alice, mut bob) = establish_pair(&url).await;

    // First chat frame after establishment decrypts to exactly what was sent.
    bob.send_text("hello").await.expect("send");
    let msg = timeout(Duration::from_secs(2), alice.recv())
        .await
        .expect("recv timed out")
        .expect("recv");
    assert_eq!(msg.as_str(), "hello");

    // Both directions share the one channel key.
    alice.send_text("hello yourself").await.expect("send");
    let msg = timeout(Duration::from_secs(2), bob.recv())
        .await
        .expect("recv timed out")
        .expect("recv");
    assert_eq!(msg.as_str(), "hello yourself");

    alice.close().await;
    bob.close().await;
}

#[tokio::test]
async fn test_garbage_frame_discarded_channel_survives() {
    let url = start_relay().await;
    let (mut alice, mut bob) = establish_pair(&url).await;

    // A third connection joins after establishment and injects bytes that
    // cannot authenticate under the pair's channel key.
    let (mut mallory, _) = connect_async(&url).await.expect("mallory connect");
    sleep(Duration::from_millis(50)).await;
    mallory
        .send(WsMessage::Binary(vec![0xff; 48]))
        .await
        .expect("inject");
    sleep(Duration::from_millis(100)).await;

    // recv() skips the unauthenticated frame and delivers the next real one.
    alice.send_text("after the noise").await.expect("send");
    let msg = timeout(Duration::from_secs(2), bob.recv())
        .await
        .expect("recv timed out")
        .expect("recv");
    assert_eq!(msg.as_str(), "after the noise");

    alice.close().await;
    bob.close().await;
}

#[tokio::test]
async fn test_invalid_peer_key_aborts_establishment() {
    let url = start_relay().await;

    // Raw peer first so the client's handshake frame has a receiver.
    let (mut faker, _) = connect_async(&url).await.expect("faker connect");
    let pending = SecureChat::connect(dev_config(&url)).await.expect("connect");
    sleep(Duration::from_millis(50)).await;

    // 16 bytes cannot be an X25519 public key.
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        let _ = faker.send(WsMessage::Binary(vec![0u8; 16])).await;
        sleep(Duration::from_secs(5)).await;
    });

    let result = timeout(Duration::from_secs(2), pending.establish())
        .await
        .expect("establish timed out");
    match result {
        Err(TransportError::Channel(e)) => {
            assert_eq!(e, ChannelError::InvalidPeerKey);
        }
        other => panic!("expected channel error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_plain_ws_rejected_without_dev_flag() {
    let result = SecureChat::connect(TransportConfig::new("ws://127.0.0.1:1")).await;
    match result {
        Err(TransportError::ConnectionFailed(_)) => {}
        other => panic!("expected connection refusal, got {:?}", other.map(|_| ())),
    }
}
