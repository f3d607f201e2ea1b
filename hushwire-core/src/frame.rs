//! Wire framing constants and bounds checking.
//!
//! The transport is message-framed (one WebSocket binary message per frame),
//! so there is no length prefix and no type byte. Frame 0 of every
//! connection is the raw public key; every later frame is:
//!
//! ```text
//! +----------------+---------------------------+
//! | NONCE (12 B)   | CIPHERTEXT + TAG (≥16 B)  |
//! +----------------+---------------------------+
//! ```
//!
//! The handshake/chat distinction is purely positional. A handshake frame
//! and a chat frame are told apart only by whether the channel key exists.

use crate::error::ChannelError;

/// Raw X25519 public key length (frame 0).
pub const PUBLIC_KEY_LEN: usize = 32;

/// AES-GCM nonce length, prefixed to every chat frame.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length, appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Maximum plaintext length accepted for a single message.
pub const MAX_PLAINTEXT_LEN: usize = 4096;

/// Split a chat frame into its nonce and ciphertext-plus-tag parts.
///
/// # Errors
///
/// Returns `DecodeFailure` if the frame is shorter than the 12-byte nonce.
/// A frame whose remainder is too short to hold a tag is left to the AEAD
/// open step, which rejects it as an authentication failure.
pub fn split_frame(frame: &[u8]) -> Result<(&[u8], &[u8]), ChannelError> {
    if frame.len() < NONCE_LEN {
        return Err(ChannelError::DecodeFailure);
    }
    Ok(frame.split_at(NONCE_LEN))
}

/// Validate outbound plaintext bounds.
///
/// # Errors
///
/// Returns `EmptyPlaintext` or `PlaintextTooLarge`.
pub fn validate_plaintext(plaintext: &str) -> Result<(), ChannelError> {
    if plaintext.is_empty() {
        return Err(ChannelError::EmptyPlaintext);
    }
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(ChannelError::PlaintextTooLarge);
    }
    Ok(())
}
