//! Process-wide encryption key and the transforms that use it
//!
//! The key and IV are fixed for a whole distribution, so the same plaintext
//! always encrypts to the same ciphertext. That keeps encrypted blobs
//! content-addressable by the hash of their ciphertext.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use bytes::Bytes;

use super::ContentAttribute;

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;
/// Size of the AES-GCM IV (nonce) in bytes
pub const IV_SIZE: usize = 12;

/// Errors that can occur while transforming content
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("content is encrypted but no encryption key is configured")]
    MissingKey,
    #[error("invalid key size, expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },
    #[error("invalid iv size, expected {expected}, got {actual}")]
    InvalidIvSize { expected: usize, actual: usize },
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("decrypt error")]
    Decrypt,
    #[error("encrypt error")]
    Encrypt,
}

/// AES-256-GCM key and IV shared by every encrypted entry
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey").finish_non_exhaustive()
    }
}

impl EncryptionKey {
    /// Create a key from raw bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not [`KEY_SIZE`] bytes or `iv` is not
    /// [`IV_SIZE`] bytes.
    pub fn from_slices(key: &[u8], iv: &[u8]) -> Result<Self, TransformError> {
        let key: [u8; KEY_SIZE] = key.try_into().map_err(|_| TransformError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        let iv: [u8; IV_SIZE] = iv.try_into().map_err(|_| TransformError::InvalidIvSize {
            expected: IV_SIZE,
            actual: iv.len(),
        })?;
        Ok(Self { key, iv })
    }

    /// Create a key from hex-encoded key and IV strings
    pub fn from_hex(key: &str, iv: &str) -> Result<Self, TransformError> {
        let key = hex::decode(key.trim())?;
        let iv = hex::decode(iv.trim())?;
        Self::from_slices(&key, &iv)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.cipher()
            .encrypt(Nonce::from_slice(&self.iv), data)
            .map_err(|_| TransformError::Encrypt)
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.cipher()
            .decrypt(Nonce::from_slice(&self.iv), data)
            .map_err(|_| TransformError::Decrypt)
    }
}

/// Turn raw fetched bytes into final content
pub fn decode(
    raw: Bytes,
    attr: ContentAttribute,
    key: Option<&EncryptionKey>,
) -> Result<Bytes, TransformError> {
    match attr {
        ContentAttribute::Plain => Ok(raw),
        ContentAttribute::Encrypted => {
            let key = key.ok_or(TransformError::MissingKey)?;
            Ok(Bytes::from(key.decrypt(&raw)?))
        }
    }
}

/// Inverse of [`decode`], used when publishing content
pub fn encode(
    plain: Bytes,
    attr: ContentAttribute,
    key: Option<&EncryptionKey>,
) -> Result<Bytes, TransformError> {
    match attr {
        ContentAttribute::Plain => Ok(plain),
        ContentAttribute::Encrypted => {
            let key = key.ok_or(TransformError::MissingKey)?;
            Ok(Bytes::from(key.encrypt(&plain)?))
        }
    }
}
