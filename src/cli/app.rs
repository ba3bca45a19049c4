use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grid-export")]
#[command(about = "Export patient grid data to multi-tab spreadsheets")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk through the download wizard for one grid
    Download(DownloadArgs),
    /// Print the column groups (tabs) of a flattened table
    Partition(PartitionArgs),
}

#[derive(Args)]
pub struct DownloadArgs {
    /// Grid identifier; prepared data is read from <data-dir>/<grid-id>.json
    pub grid_id: String,

    /// Directory holding prepared downloads
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory to write the output into (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct PartitionArgs {
    /// JSON file holding a 2-D array of cells
    pub file: PathBuf,

    /// Report the last range one past the final column, as older exports did
    #[arg(long)]
    pub legacy_ranges: bool,
}
