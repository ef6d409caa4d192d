use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;

/// Write `data` to `path` so the final name only ever shows complete content.
///
/// The bytes go to a temp file in the same directory, which is synced and
/// then renamed over `path`. The parent directory must already exist.
pub async fn write_atomic(path: &Path, data: Bytes) -> io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &data))
        .await
        .map_err(io::Error::other)?
}

pub fn write_atomic_blocking(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// True if `path` is a `/`-separated relative path that stays below its root
pub fn is_entry_path(path: &str) -> bool {
    if path.is_empty() || path.contains('\\') {
        return false;
    }
    // components() folds away empty and `.` segments, so check the raw split
    // too: `a//b` and `a/./b` must not alias `a/b`
    let segments_ok = path
        .split('/')
        .all(|part| !part.is_empty() && part != "." && part != "..");
    segments_ok
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Where the entry `path` lands under `root`
pub fn entry_target(root: &Path, path: &str) -> PathBuf {
    path.split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
