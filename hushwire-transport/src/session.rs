//! Secure chat session API.
//!
//! Connecting is split in two phases, because the relay stores nothing:
//! a handshake frame sent before the peer's connection is open is lost
//! forever. [`SecureChat::connect`] opens the socket; [`PendingChat::establish`]
//! sends the local public key and blocks until the peer's key arrives.
//! Callers that want both endpoints to see each other's frame 0 should
//! connect both sides before establishing either.
//!
//! # Invariants
//!
//! - The local public key is the first frame sent, before any chat traffic.
//! - The first inbound frame is consumed as the peer's public key, purely
//!   by position; there is no type tag.
//! - The channel key is derived exactly once per connection and reused for
//!   every message in both directions.
//! - Neither `PendingChat` nor `SecureChat` implements `Clone`.

use hushwire_core::state::{Channel, ChannelEvent};
use hushwire_core::ChannelError;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::message::Message;
use crate::relay::RelayLink;

/// A connected but not yet established session.
///
/// The ephemeral keypair already exists; no frame has been sent yet.
pub struct PendingChat {
    link: RelayLink,
    channel: Channel,
}

impl PendingChat {
    /// Run the channel establishment.
    ///
    /// Sends the local public key as frame 0, then awaits the first inbound
    /// frame and consumes it as the peer's public key.
    ///
    /// There is no handshake timeout: if no peer ever joins the relay this
    /// future stays pending in `AwaitingPeerKey` indefinitely. That is an
    /// accepted protocol limitation, not a bug; wrap the call in
    /// `tokio::time::timeout` if the application needs a bound.
    ///
    /// # Errors
    ///
    /// Returns an error if transport fails or the received peer key is
    /// invalid. A failed establishment is never retried silently.
    pub async fn establish(mut self) -> Result<SecureChat, TransportError> {
        // Frame 0: raw public key bytes, unframed, before any chat traffic.
        self.link
            .send_frame(self.channel.local_public_key().to_vec())
            .await?;

        let frame = self.link.recv_frame().await?;
        match self.channel.on_frame(&frame) {
            Ok(ChannelEvent::Established) => {
                tracing::debug!("secure channel established");
                Ok(SecureChat {
                    link: self.link,
                    channel: self.channel,
                })
            }
            Ok(ChannelEvent::Message(_)) => {
                // Unreachable while AwaitingPeerKey; treat as a violation.
                Err(TransportError::Channel(ChannelError::InvalidPeerKey))
            }
            Err(e) => {
                self.link.close().await;
                Err(e.into())
            }
        }
    }
}

/// An established secure chat session with one peer.
pub struct SecureChat {
    link: RelayLink,
    channel: Channel,
}

impl SecureChat {
    /// Connect to the relay.
    ///
    /// Generates the ephemeral keypair before any network I/O, but sends
    /// nothing yet; call [`PendingChat::establish`] to run the key exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not `wss://` (unless `insecure_dev`)
    /// or the connection fails.
    pub async fn connect(config: TransportConfig) -> Result<PendingChat, TransportError> {
        if !config.insecure_dev && !config.server_url.starts_with("wss://") {
            return Err(TransportError::ConnectionFailed(
                "wss:// required (use insecure_dev for local testing)".into(),
            ));
        }

        let link = RelayLink::connect(&config.server_url).await?;
        let channel = Channel::new();
        Ok(PendingChat { link, channel })
    }

    /// Encrypt and send a text message.
    ///
    /// Every call produces exactly one wire frame with a fresh nonce.
    ///
    /// # Errors
    ///
    /// Returns an error on bounds violations (empty or oversized plaintext)
    /// or transport failure.
    pub async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        let frame = self.channel.encrypt(text)?;
        self.link.send_frame(frame).await
    }

    /// Receive the next decrypted message.
    ///
    /// Per-message failures — tag mismatch, malformed frame, invalid
    /// UTF-8 — are reported via `tracing::warn!`, the frame discarded, and
    /// the loop continues: the channel key remains valid for later frames.
    /// A failed frame is never surfaced as chat content.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport loss or disconnect.
    pub async fn recv(&mut self) -> Result<Message, TransportError> {
        loop {
            let frame = self.link.recv_frame().await?;
            match self.channel.on_frame(&frame) {
                Ok(ChannelEvent::Message(text)) => {
                    return Ok(Message::new(text));
                }
                Ok(ChannelEvent::Established) => {
                    // Cannot occur after establish(); ignore defensively.
                    continue;
                }
                Err(
                    e @ (ChannelError::AuthenticationFailure
                    | ChannelError::DecodeFailure
                    | ChannelError::EncodingFailure),
                ) => {
                    tracing::warn!(error = %e, "discarding undecryptable frame");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Close the session and the underlying connection.
    ///
    /// Sends a WebSocket close frame. Dropping the session without calling
    /// this still tears down the TCP stream, just without the close frame.
    pub async fn close(mut self) {
        self.link.close().await;
    }
}
