//! Transport errors.

use std::fmt;

/// Errors that can occur during transport operations.
#[derive(Debug)]
pub enum TransportError {
    /// Failed to establish the WebSocket connection.
    ConnectionFailed(String),
    /// Channel-level error from hushwire-core. An `InvalidPeerKey` here
    /// means establishment was aborted and the connection is unusable for
    /// chat; it is surfaced, never retried silently.
    Channel(hushwire_core::ChannelError),
    /// WebSocket error.
    WebSocket(String),
    /// Peer disconnected or connection lost.
    PeerDisconnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            Self::Channel(e) => write!(f, "channel error: {}", e),
            Self::WebSocket(msg) => write!(f, "websocket error: {}", msg),
            Self::PeerDisconnected => write!(f, "peer disconnected"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<hushwire_core::ChannelError> for TransportError {
    fn from(e: hushwire_core::ChannelError) -> Self {
        Self::Channel(e)
    }
}
