use std::path::PathBuf;

use crate::crypto::EncryptionKey;
use crate::hash::HashAlgorithm;

/// Settings a [`Fetcher`](super::Fetcher) is built with
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Flat directory of cached raw blobs, one file per hash
    pub cache_dir: PathBuf,
    /// Algorithm used to classify hashes and verify downloads
    pub hash_algorithm: HashAlgorithm,
    /// Required only when an entry is encrypted
    pub encryption: Option<EncryptionKey>,
    /// Digest downloaded bytes and reject those that don't match their hash
    pub verify_integrity: bool,
}

impl FetchConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            hash_algorithm: HashAlgorithm::default(),
            encryption: None,
            verify_integrity: true,
        }
    }

    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }

    pub fn with_encryption(mut self, key: Option<EncryptionKey>) -> Self {
        self.encryption = key;
        self
    }

    pub fn with_verify_integrity(mut self, verify: bool) -> Self {
        self.verify_integrity = verify;
        self
    }
}
