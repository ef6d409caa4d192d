use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};

use common::filter::{filter_pack, FilterError};
use common::pack::{PackError, PackFile};

pub mod create;
pub mod extract;
pub mod ls;

use crate::cli::op::Op;

crate::command_enum! {
    (Ls, ls::Ls),
    (Extract, extract::Extract),
    (Create, create::Create),
}

pub type PackCommand = Command;

/// Inspect, unpack and build pack files
#[derive(Args, Debug, Clone)]
pub struct Pack {
    #[command(subcommand)]
    pub command: PackCommand,
}

#[async_trait::async_trait]
impl Op for Pack {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackFileError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid pack file: {0}")]
    Pack(#[from] PackError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("refusing to write entry outside the target directory: {0}")]
    UnsafePath(String),
    #[error("path is not valid utf-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

impl PackFileError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| PackFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a pack from disk and narrow it through `filter`, if any
async fn open_pack(
    path: &Path,
    filter: Option<&str>,
) -> Result<(PackFile, Bytes), PackFileError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(PackFileError::io(path))?;
    let (pack, payload) = PackFile::open(Bytes::from(data))?;

    let pack = match filter {
        Some(command) => filter_pack(&pack, command).await?,
        None => pack,
    };
    Ok((pack, payload))
}
