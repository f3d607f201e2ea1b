//! Secure channel establishment.
//!
//! An ephemeral X25519 key exchange followed by a fixed derivation:
//! the channel key is the SHA-256 digest of the raw shared secret,
//! imported directly as an AES-256-GCM key.
//!
//! The digest-of-raw-secret step is NOT a proper KDF (no salt, no info
//! string, no domain separation). It is preserved exactly as specified for
//! wire compatibility with peers implementing the same scheme. Do not
//! replace it with HKDF without a protocol version change.
//!
//! # Security Properties
//!
//! - Keypairs are ephemeral: generated fresh per connection, never persisted
//! - The private half never leaves the process; derivation consumes it
//! - The shared secret exists only transiently inside `derive_channel_key`
//!   and is zeroized on drop
//! - The exchange is unauthenticated (accepted non-goal)

use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ChannelError;
use crate::frame::PUBLIC_KEY_LEN;

/// Connection-scoped ephemeral keypair.
///
/// Usable only for key agreement. The secret half is consumed by
/// `derive_channel_key`, making a second derivation unrepresentable.
pub struct EphemeralKeypair {
    secret: EphemeralSecret,
    public: PublicKey,
}

impl EphemeralKeypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Raw 32-byte public key encoding, suitable for direct transmission.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Derive the symmetric channel key from the peer's raw public key.
    ///
    /// Computes the X25519 shared secret, hashes it with SHA-256, and
    /// imports the digest as the channel key. Consumes the keypair: the
    /// derivation happens at most once per connection.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeerKey` if the input is not exactly 32 bytes, or if
    /// the agreement is non-contributory (low-order or identity point).
    /// Callers that need to keep the keypair on a length error should check
    /// the length before consuming it (see [`crate::state::Channel`]).
    pub fn derive_channel_key(self, peer_public: &[u8]) -> Result<ChannelKey, ChannelError> {
        let peer_bytes: [u8; PUBLIC_KEY_LEN] = peer_public
            .try_into()
            .map_err(|_| ChannelError::InvalidPeerKey)?;
        let peer_key = PublicKey::from(peer_bytes);

        let shared = self.secret.diffie_hellman(&peer_key);
        if !shared.was_contributory() {
            return Err(ChannelError::InvalidPeerKey);
        }

        let digest: [u8; 32] = Sha256::digest(shared.as_bytes()).into();
        Ok(ChannelKey { bytes: digest })
    }
}

/// The symmetric channel key.
///
/// Derived exactly once per connection, immutable, reused for every message
/// in both directions until disconnect. Zeroized on drop. Both endpoints
/// derive byte-identical keys by the symmetry of X25519.
///
/// Does not implement `Clone`: one connection, one key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ChannelKey {
    pub(crate) bytes: [u8; 32],
}

impl std::fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("ChannelKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_uniqueness() {
        let a = EphemeralKeypair::generate();
        let b = EphemeralKeypair::generate();
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_derivation_symmetry() {
        let a = EphemeralKeypair::generate();
        let b = EphemeralKeypair::generate();
        let a_pub = a.public_key_bytes();
        let b_pub = b.public_key_bytes();

        let key_a = a.derive_channel_key(&b_pub).unwrap();
        let key_b = b.derive_channel_key(&a_pub).unwrap();
        assert_eq!(key_a.bytes, key_b.bytes);
    }

    #[test]
    fn test_wrong_length_peer_key() {
        for len in [0usize, 16, 31, 33, 64] {
            let kp = EphemeralKeypair::generate();
            let bogus = vec![0x42u8; len];
            assert_eq!(
                kp.derive_channel_key(&bogus).unwrap_err(),
                ChannelError::InvalidPeerKey
            );
        }
    }

    #[test]
    fn test_low_order_point_rejected() {
        // The identity point yields an all-zero shared secret, which the
        // contributory check rejects.
        let kp = EphemeralKeypair::generate();
        let identity = [0u8; 32];
        assert_eq!(
            kp.derive_channel_key(&identity).unwrap_err(),
            ChannelError::InvalidPeerKey
        );
    }

    #[test]
    fn test_key_matches_reference_derivation() {
        // The channel key must be exactly SHA-256 of the raw DH output,
        // with no salt or info string. Recompute from the other side's view.
        let a = EphemeralKeypair::generate();
        let b = EphemeralKeypair::generate();
        let a_pub = a.public_key_bytes();
        let b_pub = b.public_key_bytes();

        let key = a.derive_channel_key(&b_pub).unwrap();

        let b_secret_view = b.derive_channel_key(&a_pub).unwrap();
        // Symmetry already checks equality; this pins the digest length.
        assert_eq!(key.bytes.len(), 32);
        assert_eq!(key.bytes, b_secret_view.bytes);
    }
}
