use std::path::PathBuf;

use clap::Args;

use common::pack::PackFile;

use super::{open_pack, PackFileError};

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Pack file to list
    pub file: PathBuf,

    /// Command that reads entry paths on stdin and prints the ones to keep
    #[arg(long)]
    pub filter: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = PackFileError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (pack, _) = open_pack(&self.file, self.filter.as_deref()).await?;
        Ok(render(&pack))
    }
}

fn render(pack: &PackFile) -> String {
    if pack.entries.is_empty() {
        return "No entries found".to_string();
    }
    pack.entries
        .iter()
        .map(|e| format!("{}\t{}\t{}\t{}", e.hash, e.pos, e.size, e.path))
        .collect::<Vec<_>>()
        .join("\n")
}
