use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{is_trusted_empty, DistributeError, Distributor};
use crate::bucket::{Bucket, Content};
use crate::store::Fetcher;

pub const FETCH_ALL_CONCURRENCY: usize = 8;
/// Extra attempts after the first failure
pub const RETRY_LIMIT: usize = 3;

impl Distributor {
    /// Populate the local cache with every entry of `bucket`.
    ///
    /// Returns the first unrecoverable error. Once one entry fails, tasks
    /// that have not started yet finish as no-ops; tasks already fetching
    /// run to completion.
    pub async fn fetch_all(&self, bucket: &Bucket) -> Result<(), DistributeError> {
        let limit = Arc::new(Semaphore::new(FETCH_ALL_CONCURRENCY));
        let cancel = CancellationToken::new();

        let mut tasks = JoinSet::new();
        for content in bucket.contents().cloned() {
            let fetcher = self.fetcher.clone();
            let limit = limit.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    permit = limit.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return Ok(()),
                    },
                    _ = cancel.cancelled() => return Ok(()),
                };
                if cancel.is_cancelled() {
                    return Ok(());
                }

                let result = fetch_with_retry(&fetcher, &content).await;
                if result.is_err() {
                    cancel.cancel();
                }
                result
            });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(DistributeError::from).and_then(|r| r);
            if let Err(e) = result {
                cancel.cancel();
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!("fetched {} entries into cache", bucket.len());
                Ok(())
            }
        }
    }
}

async fn fetch_with_retry(fetcher: &Fetcher, content: &Content) -> Result<(), DistributeError> {
    tracing::debug!("downloading {}", content.path);

    // the remote never stores empty blobs
    if is_trusted_empty(fetcher, content) {
        return fetcher
            .cache()
            .write_placeholder(&content.hash)
            .await
            .map_err(DistributeError::io(&content.path));
    }

    let mut retries = 0;
    loop {
        match fetcher.fetch(&content.hash, content.attr).await {
            Ok(_) => return Ok(()),
            Err(e) if retries < RETRY_LIMIT => {
                retries += 1;
                tracing::warn!(
                    "retry for {} ({}), retry count {}",
                    content.path,
                    e,
                    retries
                );
            }
            Err(e) => return Err(DistributeError::fetch(&content.path)(e)),
        }
    }
}
