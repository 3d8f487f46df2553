//! CLI argument parsing using clap derive

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// dbsync - Export a SQL Server database into a database project
#[derive(Parser, Debug)]
#[command(name = "dbsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Script every non-system object into the project
    ///
    /// Examples:
    ///   dbsync sync                              # project in current directory
    ///   dbsync sync -p Sales.sqlproj -s db.json  # explicit project and snapshot
    ///   dbsync sync --jobs 4                     # four scripting workers
    Sync(SyncArgs),

    /// List exportable objects and the script path of each
    List(ListArgs),
}

/// Where the project and the database come from
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SourceArgs {
    /// Project file; the single .sqlproj in the current directory when omitted
    #[arg(short, long, env = "DBSYNC_PROJECT")]
    pub project: Option<PathBuf>,

    /// Catalog snapshot to read the database from; overrides [source] snapshot
    #[arg(short, long, env = "DBSYNC_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of scripting workers; overrides [engine] parallelism
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,
}
