//! Zeroizing message wrapper.
//!
//! Plaintext is short-lived by construction. Callers must opt in to
//! keeping it past the wrapper's lifetime.

use zeroize::Zeroizing;

/// A decrypted chat message, zeroized on drop.
///
/// UTF-8 validity is established at decryption, so the text is carried
/// as-is and access is infallible. Does not implement `Clone`; use
/// [`Message::into_string`] to keep the content.
pub struct Message(Zeroizing<String>);

impl Message {
    /// Wrap decrypted text.
    pub(crate) fn new(text: String) -> Self {
        Self(Zeroizing::new(text))
    }

    /// The message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Message length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the message is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the text out of the zeroizing wrapper.
    ///
    /// The returned `String` is the caller's responsibility; it will not
    /// be zeroized.
    pub fn into_string(mut self) -> String {
        std::mem::take(&mut self.0)
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print plaintext.
        write!(f, "Message({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        let msg = Message::new("hidden hello".to_string());
        assert_eq!(msg.as_str(), "hidden hello");
        assert_eq!(msg.len(), 12);
        assert!(!msg.is_empty());
    }

    #[test]
    fn test_into_string() {
        let msg = Message::new("hello world".to_string());
        assert_eq!(msg.into_string(), "hello world");
    }

    #[test]
    fn test_debug_redacts_content() {
        let msg = Message::new("secret".to_string());
        let printed = format!("{:?}", msg);
        assert!(!printed.contains("secret"));
        assert_eq!(printed, "Message(6 bytes)");
    }
}
