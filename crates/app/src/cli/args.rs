pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "cfs")]
#[command(about = "Fetch, cache and sync content-addressed buckets")]
pub struct Args {
    /// Base URL of the remote store (http://, https:// or file://)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the cfs config directory (defaults to ~/.cfs)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Local cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: crate::Command,
}
