//! Bulk operations over a bucket
//!
//! Three regimes, each matched to its job:
//!
//! - [`Distributor::exists_all`]: 32 workers drain a bounded queue of entries
//!   and issue HEAD requests against the raw data locations. Failures are
//!   recorded as `false`, never propagated.
//! - [`Distributor::fetch_all`]: at most 8 concurrent fetches into the local
//!   cache, each retried up to [`RETRY_LIMIT`] times. The first unrecoverable
//!   error cancels everything that has not started yet.
//! - [`Distributor::sync`]: strictly sequential materialization into a target
//!   directory with atomic writes. Stops at the first error without rolling
//!   back files already written.

mod exists;
mod fetch_all;
mod sync;

use std::io;

use crate::bucket::Content;
use crate::store::{FetchError, Fetcher};

pub use exists::EXISTS_ALL_WORKERS;
pub use fetch_all::{FETCH_ALL_CONCURRENCY, RETRY_LIMIT};

#[derive(Debug, thiserror::Error)]
pub enum DistributeError {
    #[error("failed to fetch '{path}': {source}")]
    Fetch { path: String, source: FetchError },
    #[error("failed to write '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl DistributeError {
    fn fetch(path: &str) -> impl FnOnce(FetchError) -> Self + '_ {
        move |source| DistributeError::Fetch {
            path: path.to_string(),
            source,
        }
    }

    fn io(path: &str) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| DistributeError::Io {
            path: path.to_string(),
            source,
        }
    }
}

/// Drives bulk operations through a shared [`Fetcher`]
#[derive(Debug, Clone)]
pub struct Distributor {
    fetcher: Fetcher,
}

impl Distributor {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}

/// Whether `content` can be treated as empty without asking the remote.
///
/// With integrity checks on, a size of 0 only counts when the hash is the
/// empty digest; anything else is fetched and verified like a normal entry.
fn is_trusted_empty(fetcher: &Fetcher, content: &Content) -> bool {
    if content.size != 0 {
        return false;
    }
    let config = fetcher.config();
    if !config.verify_integrity {
        return true;
    }
    if content.hash != config.hash_algorithm.digest_hex(b"") {
        tracing::warn!(
            "{} has size 0 but hash {} is not the empty digest, fetching",
            content.path,
            content.hash
        );
        return false;
    }
    true
}
