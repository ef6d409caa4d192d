use std::path::PathBuf;

use clap::Args;

use common::distribute::DistributeError;

use super::source::{BucketSource, SourceError};

#[derive(Args, Debug, Clone)]
pub struct SyncBucket {
    #[command(flatten)]
    pub source: BucketSource,

    /// Directory to write the bucket's files into
    #[arg(long, short = 'd', default_value = ".")]
    pub directory: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("sync failed: {0}")]
    Distribute(#[from] DistributeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for SyncBucket {
    type Error = SyncError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (distributor, bucket) = self.source.load(ctx).await?;
        let written = distributor.sync(&bucket, &self.directory).await?;

        Ok(format!(
            "Synced {} files to {}",
            written,
            self.directory.display()
        ))
    }
}
