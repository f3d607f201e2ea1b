//! Transport configuration.

/// Configuration for connecting to a relay.
#[derive(Debug)]
pub struct TransportConfig {
    /// Relay server URL (e.g., "wss://relay:8080" or "ws://localhost:8080")
    pub server_url: String,
    /// Allow insecure ws:// connections (for localhost development only)
    pub insecure_dev: bool,
}

impl TransportConfig {
    /// Create a new configuration.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            insecure_dev: false,
        }
    }

    /// Allow insecure ws:// connections (for localhost development only).
    ///
    /// # Security Warning
    ///
    /// This disables transport encryption between client and relay. The
    /// end-to-end layer still applies, but the handshake key becomes
    /// trivially observable on the path. Only use for local testing.
    pub fn with_insecure_dev(mut self) -> Self {
        self.insecure_dev = true;
        self
    }
}
