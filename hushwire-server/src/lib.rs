//! Hushwire relay server.
//!
//! A stateless fan-out broadcaster: every binary WebSocket message from one
//! connection is delivered verbatim to every other open connection. The
//! server never inspects, parses, or reorders payloads; it has no protocol
//! awareness and cannot read any chat content.

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::net::IpAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async_with_config;
use tokio_tungstenite::tungstenite::protocol::{Message, WebSocketConfig};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

pub mod registry;

use registry::Registry;

/// Per-connection outbound queue depth. A peer that falls this far behind
/// is dropped rather than stalling the broadcast.
pub const MAX_QUEUE_DEPTH: usize = 32;

/// Connection cap per source IP.
pub const MAX_CONN_PER_IP: usize = 5;

/// Hard limit on a single WebSocket message. A chat frame is
/// nonce + ciphertext + tag; this leaves ample headroom over the client's
/// 4096-byte plaintext cap without letting anyone relay arbitrary blobs.
pub const MAX_WS_MESSAGE_SIZE: usize = 8192;

type IpConnMap = Arc<DashMap<IpAddr, usize>>;

/// Run the relay until the listener fails.
///
/// Each accepted connection is registered, its binary messages broadcast to
/// all other connections, and deregistered on disconnect.
pub async fn run_server(listener: TcpListener) {
    let registry = Arc::new(Registry::new());
    let ip_conns: IpConnMap = Arc::new(DashMap::new());

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let registry = registry.clone();
        let ip_conns = ip_conns.clone();
        let ip = peer_addr.ip();

        let admitted = {
            let mut count = ip_conns.entry(ip).or_insert(0);
            if *count >= MAX_CONN_PER_IP {
                false
            } else {
                *count += 1;
                true
            }
        };
        if !admitted {
            tracing::warn!(%ip, "connection cap reached, refusing");
            continue;
        }

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, registry).await {
                tracing::debug!(%ip, error = %e, "connection ended with error");
            }
            // Drop the counter entry at zero so the map does not grow by
            // one entry per IP ever seen.
            if let Entry::Occupied(mut entry) = ip_conns.entry(ip) {
                let count = entry.get_mut();
                *count = count.saturating_sub(1);
                if *count == 0 {
                    entry.remove();
                }
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    registry: Arc<Registry>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = WebSocketConfig {
        max_message_size: Some(MAX_WS_MESSAGE_SIZE),
        max_frame_size: Some(MAX_WS_MESSAGE_SIZE),
        ..WebSocketConfig::default()
    };
    let ws = accept_async_with_config(stream, Some(config)).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    // Add-on-connect: the only point a connection enters the registry.
    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(MAX_QUEUE_DEPTH);
    let id = registry.register(tx);
    tracing::info!(connection = id, peers = registry.len(), "client connected");

    // Writer task owns the sink. Ends when the registry drops our sender.
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_tx.send(Message::Binary(payload)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Relay loop: strictly sequential per connection.
    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Binary(payload)) => {
                let delivered = registry.broadcast_from(id, &payload);
                tracing::trace!(connection = id, bytes = payload.len(), delivered, "relayed");
            }
            Ok(Message::Close(_)) => break,
            // Text, ping and pong carry no protocol meaning here.
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(connection = id, error = %e, "read error");
                break;
            }
        }
    }

    // Remove-on-disconnect: the only point a connection leaves the registry.
    registry.deregister(id);
    writer.abort();
    tracing::info!(connection = id, peers = registry.len(), "client disconnected");

    Ok(())
}
