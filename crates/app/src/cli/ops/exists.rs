use std::collections::BTreeMap;

use clap::Args;

use common::distribute::DistributeError;

use super::source::{BucketSource, SourceError};

/// Check that every entry is present on the remote store
#[derive(Args, Debug, Clone)]
pub struct Exists {
    #[command(flatten)]
    pub source: BucketSource,
}

#[derive(Debug, thiserror::Error)]
pub enum ExistsError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("existence check failed: {0}")]
    Distribute(#[from] DistributeError),
    #[error("{count} of {total} entries missing from remote:\n{paths}")]
    Missing {
        count: usize,
        total: usize,
        paths: String,
    },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Exists {
    type Error = ExistsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (distributor, bucket) = self.source.load(ctx).await?;
        let results = distributor.exists_all(&bucket).await?;
        summarize(&results)
    }
}

fn summarize(results: &BTreeMap<String, bool>) -> Result<String, ExistsError> {
    let missing: Vec<&str> = results
        .iter()
        .filter(|(_, found)| !**found)
        .map(|(path, _)| path.as_str())
        .collect();

    if missing.is_empty() {
        return Ok(format!("All {} entries present", results.len()));
    }
    Err(ExistsError::Missing {
        count: missing.len(),
        total: results.len(),
        paths: missing.join("\n"),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_summarize() {
        let mut results = BTreeMap::new();
        results.insert("a".to_string(), true);
        results.insert("b".to_string(), true);
        assert_eq!(summarize(&results).unwrap(), "All 2 entries present");

        results.insert("c".to_string(), false);
        match summarize(&results) {
            Err(ExistsError::Missing {
                count,
                total,
                paths,
            }) => {
                assert_eq!(count, 1);
                assert_eq!(total, 3);
                assert_eq!(paths, "c");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
