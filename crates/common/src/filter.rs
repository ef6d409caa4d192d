//! External filter commands
//!
//! A filter is any program that reads entry paths on stdin, one per line,
//! and writes back the paths to keep. Buckets and pack files are narrowed to
//! exactly the paths the command printed (set membership, order ignored).

use std::collections::HashSet;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::bucket::Bucket;
use crate::pack::PackFile;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("empty filter command")]
    EmptyCommand,
    #[error("failed to run filter '{command}': {source}")]
    Spawn { command: String, source: io::Error },
    #[error("no output from filter")]
    NoOutput,
    #[error("filter exited with {0}")]
    Failed(ExitStatus),
    #[error("filter output is not valid utf-8")]
    InvalidOutput,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Pipe `paths` through `command` and collect the surviving paths.
///
/// The command line is split on whitespace; there is no shell quoting.
pub async fn run_filter<'a>(
    command: &str,
    paths: impl IntoIterator<Item = &'a str>,
) -> Result<HashSet<String>, FilterError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or(FilterError::EmptyCommand)?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| FilterError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let mut input = String::new();
    for path in paths {
        input.push_str(path);
        input.push('\n');
    }

    // feed stdin concurrently so a chatty filter can't deadlock on a full pipe
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("filter stdin was not captured"))?;
    let writer = tokio::spawn(async move {
        stdin.write_all(input.as_bytes()).await?;
        stdin.shutdown().await
    });

    let output = child.wait_with_output().await?;
    match writer.await {
        // the filter may exit without reading everything (e.g. `head`)
        Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
        Err(e) => return Err(io::Error::other(e).into()),
        _ => {}
    }

    let stdout = String::from_utf8(output.stdout).map_err(|_| FilterError::InvalidOutput)?;
    if !output.status.success() {
        if stdout.is_empty() {
            return Err(FilterError::NoOutput);
        }
        return Err(FilterError::Failed(output.status));
    }

    Ok(split_lines(&stdout))
}

/// Any of `\r\n`, `\n\r`, `\n` or `\r` ends a line
fn split_lines(output: &str) -> HashSet<String> {
    output
        .split(|c| c == '\r' || c == '\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Narrow a bucket through `command`; an empty command keeps everything
pub async fn filter_bucket(bucket: &Bucket, command: &str) -> Result<Bucket, FilterError> {
    if command.trim().is_empty() {
        return Ok(bucket.clone());
    }
    let keep = run_filter(command, bucket.paths()).await?;
    tracing::debug!("filter kept {} of {} entries", keep.len(), bucket.len());
    Ok(bucket.retain(&keep))
}

/// Narrow a pack file through `command`; an empty command keeps everything
pub async fn filter_pack(pack: &PackFile, command: &str) -> Result<PackFile, FilterError> {
    if command.trim().is_empty() {
        return Ok(pack.clone());
    }
    let keep = run_filter(command, pack.entries.iter().map(|e| e.path.as_str())).await?;
    Ok(pack.retain(&keep))
}
