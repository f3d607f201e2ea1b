//! Per-connection channel state machine.
//!
//! Two states: `AwaitingPeerKey` (initial) → `ChannelReady` (terminal for
//! the handshake phase; chat continues in it indefinitely).
//!
//! There is no type tag on the wire. The first inbound frame is always the
//! peer's raw public key and every later frame is chat ciphertext; the
//! distinction is positional, made explicit here as a state machine rather
//! than left as "is the key present".

use crate::channel::{ChannelKey, EphemeralKeypair};
use crate::codec;
use crate::error::ChannelError;
use crate::frame::PUBLIC_KEY_LEN;

/// Channel state enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Waiting for the peer's public key (first inbound frame).
    AwaitingPeerKey,
    /// Channel key derived; all further frames are chat ciphertext.
    ChannelReady,
}

/// Result of processing an inbound frame.
#[derive(Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The handshake frame was consumed and the channel key derived.
    Established,
    /// A chat frame was decrypted.
    Message(String),
}

/// A per-connection secure channel.
///
/// Owns the ephemeral keypair until derivation and the channel key after.
/// Connections are fully independent: no state is shared between channels.
///
/// Does not implement `Clone`.
pub struct Channel {
    state: ChannelState,
    /// Present until consumed by derivation.
    keypair: Option<EphemeralKeypair>,
    /// Present from `ChannelReady` on.
    key: Option<ChannelKey>,
    local_public: [u8; 32],
}

impl Channel {
    /// Create a channel with a fresh ephemeral keypair.
    ///
    /// Called exactly once per connection, before any network I/O that
    /// could race it.
    pub fn new() -> Self {
        let keypair = EphemeralKeypair::generate();
        let local_public = keypair.public_key_bytes();
        Self {
            state: ChannelState::AwaitingPeerKey,
            keypair: Some(keypair),
            key: None,
            local_public,
        }
    }

    /// Current state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Raw local public key bytes; must be sent to the peer as frame 0,
    /// unframed and unencrypted, before any chat traffic.
    pub fn local_public_key(&self) -> [u8; 32] {
        self.local_public
    }

    /// Process one inbound frame in arrival order.
    ///
    /// In `AwaitingPeerKey` the frame is interpreted as the peer's raw
    /// public key regardless of its content; on success the channel
    /// transitions to `ChannelReady`. In `ChannelReady` the frame is
    /// chat ciphertext.
    ///
    /// # Errors
    ///
    /// - `InvalidPeerKey`: handshake frame failed import. The channel stays
    ///   in `AwaitingPeerKey`; on a wrong-length key the keypair survives,
    ///   on an invalid curve point the connection is unusable for chat.
    /// - `AuthenticationFailure` / `DecodeFailure` / `EncodingFailure`:
    ///   that one chat frame is discarded; the channel key stays valid.
    pub fn on_frame(&mut self, frame: &[u8]) -> Result<ChannelEvent, ChannelError> {
        match self.state {
            ChannelState::AwaitingPeerKey => {
                // Length check before consuming the secret, so a malformed
                // key does not burn the keypair.
                if frame.len() != PUBLIC_KEY_LEN {
                    return Err(ChannelError::InvalidPeerKey);
                }
                let keypair = self.keypair.take().ok_or(ChannelError::InvalidPeerKey)?;
                let key = keypair.derive_channel_key(frame)?;
                self.key = Some(key);
                self.state = ChannelState::ChannelReady;
                Ok(ChannelEvent::Established)
            }
            ChannelState::ChannelReady => {
                let key = self.key.as_ref().ok_or(ChannelError::NotEstablished)?;
                let text = codec::decrypt(key, frame)?;
                Ok(ChannelEvent::Message(text))
            }
        }
    }

    /// Encrypt an outbound chat message.
    ///
    /// # Errors
    ///
    /// Returns `NotEstablished` before the peer key has been received,
    /// or a codec error on bounds violations.
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, ChannelError> {
        match self.key.as_ref() {
            Some(key) => codec::encrypt(key, plaintext),
            None => Err(ChannelError::NotEstablished),
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}
