use clap::Args;

use common::bucket::Bucket;

use super::source::{BucketSource, SourceError};

/// List a bucket's entries
#[derive(Args, Debug, Clone)]
pub struct Ls {
    #[command(flatten)]
    pub source: BucketSource,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = SourceError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, bucket) = self.source.load(ctx).await?;
        Ok(render(&bucket))
    }
}

fn render(bucket: &Bucket) -> String {
    if bucket.is_empty() {
        return "No entries found".to_string();
    }
    bucket
        .contents()
        .map(|c| format!("{}\t{}\t{}\t{}", c.hash, c.size, c.attr, c.path))
        .collect::<Vec<_>>()
        .join("\n")
}
