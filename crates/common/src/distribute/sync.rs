use std::path::Path;

use bytes::Bytes;

use super::{is_trusted_empty, DistributeError, Distributor};
use crate::bucket::Bucket;
use crate::fs::{entry_target, write_atomic};

impl Distributor {
    /// Materialize every entry of `bucket` under `target_dir`.
    ///
    /// Entries are written one at a time; the first failure aborts the run
    /// and files already written stay in place. Zero-size entries whose hash is
    /// the empty digest become empty files without touching the remote.
    /// Returns the number of files written.
    pub async fn sync(
        &self,
        bucket: &Bucket,
        target_dir: &Path,
    ) -> Result<usize, DistributeError> {
        let mut written = 0;
        for content in bucket.contents() {
            tracing::debug!("downloading {}", content.path);

            let data = if is_trusted_empty(&self.fetcher, content) {
                Bytes::new()
            } else {
                self.fetcher
                    .fetch(&content.hash, content.attr)
                    .await
                    .map_err(DistributeError::fetch(&content.path))?
            };

            let target = entry_target(target_dir, &content.path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(DistributeError::io(&content.path))?;
            }
            write_atomic(&target, data)
                .await
                .map_err(DistributeError::io(&content.path))?;
            written += 1;
        }

        tracing::info!("synced {} files to {}", written, target_dir.display());
        Ok(written)
    }
}
