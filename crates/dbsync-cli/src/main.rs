//! dbsync CLI
//!
//! Exports the objects of a SQL Server database into a database project.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod progress;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose).map_err(|e| CliError::user(format!("Failed to initialize logging: {e}")))?;
    tracing::debug!("verbose mode enabled");

    let cwd = std::env::current_dir()?;
    match cli.command {
        Commands::Sync(args) => commands::run_sync(&cwd, &args),
        Commands::List(args) => commands::run_list(&cwd, &args),
    }
}
