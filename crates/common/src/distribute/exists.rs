use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinSet;

use super::{DistributeError, Distributor};
use crate::bucket::{Bucket, Content};
use crate::hash::data_path;

pub const EXISTS_ALL_WORKERS: usize = 32;

impl Distributor {
    /// Check that every entry's raw blob is present on the remote store.
    ///
    /// Returns path -> present. Attributes are ignored: this is about raw
    /// blob presence, not transformed content.
    pub async fn exists_all(
        &self,
        bucket: &Bucket,
    ) -> Result<BTreeMap<String, bool>, DistributeError> {
        let results = Arc::new(Mutex::new(BTreeMap::new()));
        let (tx, rx) = flume::bounded::<Content>(EXISTS_ALL_WORKERS);

        let mut workers = JoinSet::new();
        for _ in 0..EXISTS_ALL_WORKERS {
            let rx = rx.clone();
            let remote = self.fetcher.remote().clone();
            let results = results.clone();
            workers.spawn(async move {
                while let Ok(content) = rx.recv_async().await {
                    tracing::debug!("verifying {} ({})", content.path, content.hash);
                    let found = remote
                        .exists(&data_path(&content.hash))
                        .await
                        .unwrap_or(false);
                    results.lock().insert(content.path, found);
                }
            });
        }
        drop(rx);

        for content in bucket.contents() {
            // only fails once every worker is gone, which join_next reports
            if tx.send_async(content.clone()).await.is_err() {
                break;
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        let results = match Arc::try_unwrap(results) {
            Ok(results) => results.into_inner(),
            Err(shared) => shared.lock().clone(),
        };
        let missing = results.values().filter(|found| !**found).count();
        tracing::info!("verified {} entries, {} missing", results.len(), missing);
        Ok(results)
    }
}
