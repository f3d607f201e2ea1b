//! Hushwire Protocol Core
//!
//! Minimal two-party end-to-end encryption over a blind relay.
//!
//! This crate provides:
//! - Ephemeral X25519 channel establishment
//! - AES-256-GCM authenticated codec with per-message random nonces
//! - A per-connection two-state machine (`AwaitingPeerKey` → `ChannelReady`)
//!
//! # Security Invariants
//!
//! - The key exchange is unauthenticated: a party that controls the relay can
//!   interpose itself on the channel. Out of scope by design.
//! - The channel key is derived exactly once per connection, never rotated.
//! - Key material and plaintext buffers are zeroized on drop.
//! - Direct use of `unsafe` is forbidden (#![forbid(unsafe_code)])

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod channel;
pub mod codec;
pub mod error;
pub mod frame;
pub mod state;

pub use channel::{ChannelKey, EphemeralKeypair};
pub use error::ChannelError;
pub use state::{Channel, ChannelEvent, ChannelState};
