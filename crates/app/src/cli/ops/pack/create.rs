use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use common::fs::write_atomic;
use common::pack::PackBuilder;

use super::PackFileError;

/// Bundle every file under a directory into one pack file
#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Directory to pack
    pub directory: PathBuf,

    /// Where to write the pack file
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = PackFileError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let root = self.directory.clone();
        let files = tokio::task::spawn_blocking(move || collect_files(&root))
            .await
            .map_err(|e| PackFileError::Io {
                path: self.directory.clone(),
                source: std::io::Error::other(e),
            })??;

        let mut builder = PackBuilder::new(ctx.state.config.hash_type);
        for (path, file) in &files {
            let data = tokio::fs::read(file)
                .await
                .map_err(PackFileError::io(file))?;
            builder.add(path.clone(), &data);
        }
        let count = builder.len();
        let (_, blob) = builder.finish()?;
        let size = blob.len();

        write_atomic(&self.output, blob)
            .await
            .map_err(PackFileError::io(&self.output))?;

        Ok(format!(
            "Packed {} files ({} bytes) into {}",
            count,
            size,
            self.output.display()
        ))
    }
}

/// Every regular file below `root` as (`/`-separated relative path, full path),
/// sorted by relative path
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>, PackFileError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(PackFileError::io(&dir))?;
        for entry in entries {
            let entry = entry.map_err(PackFileError::io(&dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(PackFileError::io(&path))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let relative = relative_name(root, &path)?;
                files.push((relative, path));
            }
        }
    }

    files.sort();
    Ok(files)
}

fn relative_name(root: &Path, path: &Path) -> Result<String, PackFileError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PackFileError::NonUtf8Path(path.to_path_buf()))?;
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| PackFileError::NonUtf8Path(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("/"))
}
