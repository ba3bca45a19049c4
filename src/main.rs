use anyhow::Result;
use clap::Parser;
use log::info;

use grid_export::config::Config;

mod cli;

use cli::commands::{download_command, partition_command};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file (truncate on each run) so prompts stay readable
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("grid-export.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting grid-export");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Download(args) => download_command(args, config).await,
        Commands::Partition(args) => partition_command(args, config),
    }
}
