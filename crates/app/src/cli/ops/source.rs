use std::path::PathBuf;

use clap::Args;

use common::bucket::{Bucket, TagFile, TagFileError};
use common::crypto::EncryptionKey;
use common::distribute::Distributor;
use common::filter::{filter_bucket, FilterError};
use common::hash::HashAlgorithm;
use common::store::LoadError;

use crate::cli::op::{ContextError, OpContext};

/// Where a bucket comes from, shared by every bucket command
#[derive(Args, Debug, Clone)]
pub struct BucketSource {
    /// Manifest hash or tag name
    #[arg(required_unless_present = "tag_file")]
    pub location: Option<String>,

    /// Tag file supplying the manifest hash and key material
    #[arg(long, conflicts_with = "location")]
    pub tag_file: Option<PathBuf>,

    /// Command that reads entry paths on stdin and prints the ones to keep
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("failed to read tag file: {0}")]
    TagFile(#[from] TagFileError),
    #[error("failed to load bucket: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("tag file {path} has malformed {alg} hash '{hash}'")]
    TagFileHash {
        path: PathBuf,
        alg: HashAlgorithm,
        hash: String,
    },
    #[error("a location or --tag-file is required")]
    NoLocation,
}

impl BucketSource {
    /// Load the (filtered) bucket and a distributor configured for it
    pub async fn load(&self, ctx: &OpContext) -> Result<(Distributor, Bucket), SourceError> {
        let (location, key) = match (&self.location, &self.tag_file) {
            (_, Some(path)) => {
                let tag_file = TagFile::from_file(path)?;
                tracing::debug!("tag file {} points at {}", tag_file.name, tag_file.hash);
                tag_file_location(path, tag_file, ctx.state.config.hash_type)?
            }
            (Some(location), None) => (location.clone(), None),
            (None, None) => return Err(SourceError::NoLocation),
        };

        let fetcher = ctx.fetcher(key)?;
        let bucket = fetcher.load_bucket(&location).await?;
        let bucket = match &self.filter {
            Some(command) => filter_bucket(&bucket, command).await?,
            None => bucket,
        };

        Ok((Distributor::new(fetcher), bucket))
    }
}

/// Manifest hash and key material from a tag file
///
/// The hash goes straight into an object-store URL, so it must be a
/// well-formed digest rather than being read as a tag name.
fn tag_file_location(
    path: &std::path::Path,
    tag_file: TagFile,
    alg: HashAlgorithm,
) -> Result<(String, Option<EncryptionKey>), SourceError> {
    if !alg.is_hash(&tag_file.hash) {
        return Err(SourceError::TagFileHash {
            path: path.to_path_buf(),
            alg,
            hash: tag_file.hash,
        });
    }
    let key = tag_file.encryption_key()?;
    Ok((tag_file.hash, key))
}
