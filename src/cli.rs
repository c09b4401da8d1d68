use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docfetch")]
#[command(about = "Concurrent downloader for base64-encoded documents", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $DOCFETCH_CONFIG or config/docfetch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download documents by id
    Download(DownloadArgs),
    /// Re-run the ids that failed in a previous run's CSV log
    Retry(RetryArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Ids to download (comma or space separated)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub ids: Vec<String>,

    /// CSV file holding the ids
    #[arg(long, conflicts_with = "ids")]
    pub csv: Option<PathBuf>,

    /// CSV column name (defaults to input.csv_column)
    #[arg(long, requires = "csv")]
    pub column: Option<String>,

    /// First CSV data row to process (1-indexed)
    #[arg(long, requires = "csv")]
    pub start_line: Option<usize>,

    #[command(flatten)]
    pub run: RunOverrides,
}

#[derive(clap::Args, Debug)]
pub struct RetryArgs {
    /// Structured log (download_detailed_*.csv) of the previous run
    #[arg(long)]
    pub log: PathBuf,

    #[command(flatten)]
    pub run: RunOverrides,
}

#[derive(clap::Args, Debug, Default)]
pub struct RunOverrides {
    /// Process ids even if their file already exists
    #[arg(long)]
    pub no_resume: bool,

    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long)]
    pub batch_size: Option<usize>,
}
