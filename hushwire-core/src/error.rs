//! Protocol errors.
//!
//! Errors carry different severities (see each variant's doc):
//! a failed key import aborts channel establishment, while a failed
//! decryption only discards that one frame. The channel key itself stays
//! valid across per-message failures.

use std::fmt;

/// All possible channel errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Peer public key failed import (wrong length or invalid curve point).
    /// Aborts channel establishment; the connection stays in
    /// `AwaitingPeerKey` and is unusable for chat.
    InvalidPeerKey,

    /// AEAD tag verification failed: tampered, corrupted, or wrong key.
    /// The frame is discarded, never partially trusted.
    AuthenticationFailure,

    /// Frame too short to contain a nonce (< 12 bytes).
    /// Local and non-fatal: discard the frame, keep the channel.
    DecodeFailure,

    /// Decrypted plaintext is not valid UTF-8.
    /// Local and non-fatal: discard the frame, keep the channel.
    EncodingFailure,

    /// The AEAD seal step itself failed. Internal and not expected to
    /// occur for in-bounds plaintext; distinct from tag verification on
    /// the decrypt path.
    EncryptionFailure,

    /// Chat operation attempted before the channel key was derived.
    NotEstablished,

    /// Outbound plaintext is empty.
    EmptyPlaintext,

    /// Outbound plaintext exceeds the maximum size.
    PlaintextTooLarge,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Deliberately terse. Do not leak details.
        match self {
            Self::InvalidPeerKey => write!(f, "invalid peer key"),
            Self::AuthenticationFailure => write!(f, "authentication failure"),
            Self::DecodeFailure => write!(f, "malformed frame"),
            Self::EncodingFailure => write!(f, "invalid utf-8"),
            Self::EncryptionFailure => write!(f, "encryption failure"),
            Self::NotEstablished => write!(f, "channel not established"),
            Self::EmptyPlaintext => write!(f, "empty plaintext"),
            Self::PlaintextTooLarge => write!(f, "plaintext too large"),
        }
    }
}

impl std::error::Error for ChannelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_terse() {
        // Seal and open failures are distinct variants with distinct
        // messages; none leak key material or frame content.
        let cases = [
            (ChannelError::InvalidPeerKey, "invalid peer key"),
            (ChannelError::AuthenticationFailure, "authentication failure"),
            (ChannelError::DecodeFailure, "malformed frame"),
            (ChannelError::EncodingFailure, "invalid utf-8"),
            (ChannelError::EncryptionFailure, "encryption failure"),
            (ChannelError::NotEstablished, "channel not established"),
            (ChannelError::EmptyPlaintext, "empty plaintext"),
            (ChannelError::PlaintextTooLarge, "plaintext too large"),
        ];
        for (err, text) in cases {
            assert_eq!(err.to_string(), text);
        }
    }
}
