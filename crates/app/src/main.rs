// CLI modules
mod cli;
mod process;
mod state;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Exists, Fetch, Ls, Pack, SyncBucket, Version};

command_enum! {
    (Sync, SyncBucket),
    (Fetch, Fetch),
    (Exists, Exists),
    (Ls, Ls),
    (Pack, Pack),
    (Version, Version),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // dropped on return, flushing the non-blocking writer
    let _guard = process::init_logging(args.verbose);

    let ctx = match cli::op::OpContext::new(&args) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
