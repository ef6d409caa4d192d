use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::fs::write_atomic;

/// On-disk store of raw blob bytes, keyed by hash
///
/// Entries are immutable once named, so concurrent writers of the same
/// hash race harmlessly: each rename installs identical bytes.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `hash`. Callers validate the hash first.
    pub fn entry_path(&self, hash: &str) -> PathBuf {
        self.root.join(hash)
    }

    pub async fn contains(&self, hash: &str) -> bool {
        tokio::fs::try_exists(self.entry_path(hash))
            .await
            .unwrap_or(false)
    }

    /// Raw bytes for `hash`, or `None` on a miss
    pub async fn read(&self, hash: &str) -> io::Result<Option<Bytes>> {
        match tokio::fs::read(self.entry_path(hash)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn write(&self, hash: &str, data: Bytes) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        write_atomic(&self.entry_path(hash), data).await
    }

    /// Empty entry for zero-size content, which the remote never stores.
    /// An existing entry is left alone.
    pub async fn write_placeholder(&self, hash: &str) -> io::Result<()> {
        if self.contains(hash).await {
            return Ok(());
        }
        self.write(hash, Bytes::new()).await
    }
}
