mod cli;
mod run;

use clap::Parser;
use cli::{Cli, Commands};
use docfetch::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    docfetch::observability::init_tracing();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Download(args) => run::download(config, args).await?,
        Commands::Retry(args) => run::retry(config, args).await?,
        Commands::Config => run::print_config(&config)?,
    }

    Ok(())
}
