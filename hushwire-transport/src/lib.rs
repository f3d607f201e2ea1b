//! Hushwire Transport
//!
//! High-level async client for hushwire secure chat over a broadcast relay.
//!
//! This crate wraps `hushwire-core` and provides a simple API: connect,
//! exchange keys with the single peer on the relay, then send and receive
//! encrypted text.
//!
//! # Invariants
//!
//! - The local public key is the first thing sent on every connection,
//!   before any chat traffic.
//! - The first inbound frame is always consumed as the peer's public key.
//! - One WebSocket binary message per frame; no buffering or combining.
//! - Per-message decryption failures are logged and the frame discarded;
//!   the channel stays usable (see [`SecureChat::recv`]).
//! - `SecureChat` and `Message` do not implement `Clone`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod config;
pub mod error;
pub mod message;
mod relay;
pub mod session;

pub use config::TransportConfig;
pub use error::TransportError;
pub use message::Message;
pub use session::{PendingChat, SecureChat};
