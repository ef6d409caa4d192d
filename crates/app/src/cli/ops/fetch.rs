use clap::Args;

use common::distribute::DistributeError;

use super::source::{BucketSource, SourceError};

/// Download every entry into the local cache without writing files
#[derive(Args, Debug, Clone)]
pub struct Fetch {
    #[command(flatten)]
    pub source: BucketSource,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchAllError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("fetch failed: {0}")]
    Distribute(#[from] DistributeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Fetch {
    type Error = FetchAllError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (distributor, bucket) = self.source.load(ctx).await?;
        distributor.fetch_all(&bucket).await?;

        Ok(format!(
            "Fetched {} entries ({} bytes) into {}",
            bucket.len(),
            bucket.total_size(),
            distributor.fetcher().cache().root().display()
        ))
    }
}
