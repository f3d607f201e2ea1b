//! Authenticated codec.
//!
//! Stateless AES-256-GCM seal/open over UTF-8 text. Every call to
//! [`encrypt`] draws a fresh random 12-byte nonce from the OS CSPRNG and
//! returns `nonce || ciphertext+tag`; nothing is cached between calls.
//! No associated data is authenticated beyond the ciphertext itself.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use crate::channel::ChannelKey;
use crate::error::ChannelError;
use crate::frame::{split_frame, validate_plaintext};

/// Encrypt a chat message under the channel key.
///
/// Returns the wire frame `nonce(12) || ciphertext_and_tag`.
///
/// # Errors
///
/// Returns `EmptyPlaintext` or `PlaintextTooLarge` on bounds violations,
/// or `EncryptionFailure` if the AEAD seal itself fails (not expected for
/// in-bounds input).
pub fn encrypt(key: &ChannelKey, plaintext: &str) -> Result<Vec<u8>, ChannelError> {
    validate_plaintext(plaintext)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.bytes));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| ChannelError::EncryptionFailure)?;

    let mut frame = Vec::with_capacity(nonce.len() + ciphertext.len());
    frame.extend_from_slice(&nonce);
    frame.extend_from_slice(&ciphertext);
    Ok(frame)
}

/// Decrypt a chat frame under the channel key.
///
/// Splits the first 12 bytes as the nonce, authenticates and decrypts the
/// remainder, and decodes the plaintext as UTF-8.
///
/// # Errors
///
/// - `DecodeFailure` if the frame is shorter than 12 bytes
/// - `AuthenticationFailure` if the tag does not verify
/// - `EncodingFailure` if the plaintext is not valid UTF-8
pub fn decrypt(key: &ChannelKey, frame: &[u8]) -> Result<String, ChannelError> {
    let (nonce_bytes, ciphertext) = split_frame(frame)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.bytes));
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| ChannelError::AuthenticationFailure)?,
    );

    let text = std::str::from_utf8(&plaintext).map_err(|_| ChannelError::EncodingFailure)?;
    Ok(text.to_string())
}
