//! Tag resolution and manifest loading

use super::{FetchError, Fetcher, LoadError, ResolveError};
use crate::bucket::Bucket;
use crate::crypto::ContentAttribute;
use crate::hash::tag_path;

impl Fetcher {
    /// Raw body of `tag/<name>`
    pub async fn fetch_tag(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.remote().get(&tag_path(name)).await?.to_vec())
    }

    /// Map `location` to a manifest hash.
    ///
    /// A location that is already a hash comes back unchanged without a
    /// network call; anything else is looked up as a tag. No retries.
    pub async fn resolve_tag(&self, location: &str) -> Result<String, ResolveError> {
        if self.is_hash(location) {
            return Ok(location.to_string());
        }
        validate_tag(location)?;

        let body = self.fetch_tag(location).await?;
        let value = String::from_utf8_lossy(&body).trim().to_string();
        if !self.is_hash(&value) {
            return Err(ResolveError::NotAHash {
                tag: location.to_string(),
                value,
            });
        }

        tracing::debug!("resolved tag {} to {}", location, value);
        Ok(value)
    }

    /// Resolve `location`, fetch its manifest and parse it
    pub async fn load_bucket(&self, location: &str) -> Result<Bucket, LoadError> {
        let hash = self.resolve_tag(location).await?;
        let data = self.fetch(&hash, ContentAttribute::default()).await?;
        let bucket = Bucket::parse(&data)?;

        let expected = self.config().hash_algorithm;
        if bucket.hash_algorithm() != expected {
            return Err(LoadError::AlgorithmMismatch {
                expected,
                found: bucket.hash_algorithm(),
            });
        }

        tracing::info!(
            "loaded bucket {} ({} entries, {} bytes)",
            location,
            bucket.len(),
            bucket.total_size()
        );

        if hash == location {
            Ok(bucket)
        } else {
            Ok(bucket.with_tag(location))
        }
    }
}

/// Tag names must stay under `tag/` once joined onto the base
fn validate_tag(name: &str) -> Result<(), ResolveError> {
    let escapes = name.starts_with('/') || name.split('/').any(|part| part == "..");
    if name.is_empty() || escapes || name.contains(|c| c == '?' || c == '#') {
        return Err(ResolveError::InvalidTag(name.to_string()));
    }
    Ok(())
}
