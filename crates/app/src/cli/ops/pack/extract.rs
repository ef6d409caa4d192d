use std::path::PathBuf;

use clap::Args;

use common::fs::{entry_target, is_entry_path, write_atomic};

use super::{open_pack, PackFileError};

/// Write a pack's entries out as files
#[derive(Args, Debug, Clone)]
pub struct Extract {
    /// Pack file to extract
    pub file: PathBuf,

    /// Directory to extract into
    #[arg(long, short = 'd', default_value = ".")]
    pub directory: PathBuf,

    /// Command that reads entry paths on stdin and prints the ones to keep
    #[arg(long)]
    pub filter: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Extract {
    type Error = PackFileError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (pack, payload) = open_pack(&self.file, self.filter.as_deref()).await?;

        for entry in &pack.entries {
            if !is_entry_path(&entry.path) {
                return Err(PackFileError::UnsafePath(entry.path.clone()));
            }
            let data = pack.entry_data(&payload, entry)?;
            let target = entry_target(&self.directory, &entry.path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(PackFileError::io(parent))?;
            }
            tracing::debug!("extracting {} ({} bytes)", entry.path, entry.size);
            write_atomic(&target, data)
                .await
                .map_err(PackFileError::io(&target))?;
        }

        Ok(format!(
            "Extracted {} entries to {}",
            pack.entries.len(),
            self.directory.display()
        ))
    }
}
