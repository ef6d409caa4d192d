use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use super::{remote_from_url, FetchConfig, FetchError, LocalCache, Remote};
use crate::crypto::{self, ContentAttribute, TransformError};
use crate::hash::data_path;

/// Content-addressed fetcher over a local cache and a remote store
///
/// Cloning is cheap; clones share the remote transport and configuration.
#[derive(Debug, Clone)]
pub struct Fetcher {
    remote: Arc<dyn Remote>,
    cache: LocalCache,
    config: Arc<FetchConfig>,
}

impl Fetcher {
    pub fn new(remote: Arc<dyn Remote>, config: FetchConfig) -> Self {
        Self {
            remote,
            cache: LocalCache::new(config.cache_dir.clone()),
            config: Arc::new(config),
        }
    }

    /// Build a fetcher for the store at `base`
    pub fn from_url(base: &Url, config: FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(remote_from_url(base)?, config))
    }

    pub fn remote(&self) -> &Arc<dyn Remote> {
        &self.remote
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn is_hash(&self, s: &str) -> bool {
        self.config.hash_algorithm.is_hash(s)
    }

    /// Fetch the blob named `hash` and apply the `attr` transform.
    ///
    /// Served from the local cache when present; otherwise downloaded,
    /// cached, then transformed.
    pub async fn fetch(&self, hash: &str, attr: ContentAttribute) -> Result<Bytes, FetchError> {
        if !self.is_hash(hash) {
            return Err(FetchError::InvalidHash(hash.to_string()));
        }
        if attr.requires_key() && self.config.encryption.is_none() {
            return Err(TransformError::MissingKey.into());
        }

        let raw = match self.cache.read(hash).await? {
            Some(raw) => {
                tracing::debug!("cache hit for {}", hash);
                raw
            }
            None => {
                tracing::debug!("cache miss for {}, downloading", hash);
                self.download(hash).await?
            }
        };

        Ok(crypto::decode(raw, attr, self.config.encryption.as_ref())?)
    }

    async fn download(&self, hash: &str) -> Result<Bytes, FetchError> {
        let raw = self.remote.get(&data_path(hash)).await?;

        if self.config.verify_integrity {
            let actual = self.config.hash_algorithm.digest_hex(&raw);
            if actual != hash {
                return Err(FetchError::IntegrityMismatch {
                    expected: hash.to_string(),
                    actual,
                });
            }
        }

        self.cache.write(hash, raw.clone()).await?;
        Ok(raw)
    }
}
