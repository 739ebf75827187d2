mod ai;
mod chapters;
mod cli;
mod commands;
mod config;
mod error;
mod filename;
mod logger;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logging();

    match cli.command {
        Commands::Split {
            resolve,
            output_dir,
        } => {
            commands::split::run(&resolve, output_dir.as_deref()).await?;
        }
        Commands::Bookmark {
            resolve,
            output_dir,
        } => {
            commands::bookmark::run(&resolve, output_dir.as_deref()).await?;
        }
        Commands::List { path, config } => {
            commands::list::run(&path, config.as_deref())?;
        }
    }

    Ok(())
}
