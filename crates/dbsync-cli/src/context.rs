//! Project context detection
//!
//! Locates the project file, loads the layered configuration beside it and
//! decides which catalog snapshot to read.

use std::fs;
use std::path::{Path, PathBuf};

use dbsync_core::{ConfigResolver, SyncConfig};

use crate::cli::SourceArgs;
use crate::error::{CliError, Result};

/// Extension of SQL database project files.
pub const PROJECT_EXTENSION: &str = "sqlproj";

/// Everything a command needs to reach the project and the database.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub project_file: PathBuf,
    pub project_dir: PathBuf,
    pub config: SyncConfig,
    pub snapshot: PathBuf,
}

impl ProjectContext {
    /// Resolve the context for a command run from `cwd`.
    ///
    /// Command-line values win over configuration files.
    pub fn resolve(cwd: &Path, args: &SourceArgs) -> Result<Self> {
        let project_file = match &args.project {
            Some(path) => cwd.join(path),
            None => find_project_file(cwd)?,
        };
        let project_file = dunce::canonicalize(&project_file).map_err(|_| {
            CliError::user(format!("Project file not found: {}", project_file.display()))
        })?;
        let project_dir = project_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());

        let config = ConfigResolver::new(&project_dir).resolve()?;
        let snapshot = match &args.snapshot {
            Some(path) => cwd.join(path),
            None => config.snapshot_path(&project_dir).ok_or_else(|| {
                CliError::user(
                    "No catalog snapshot configured. Pass --snapshot or set [source] snapshot in dbsync.toml",
                )
            })?,
        };

        tracing::debug!(
            project = %project_file.display(),
            snapshot = %snapshot.display(),
            "resolved project context"
        );

        Ok(Self {
            project_file,
            project_dir,
            config,
            snapshot,
        })
    }
}

/// The single project file in `dir`.
pub fn find_project_file(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == PROJECT_EXTENSION))
        .collect();

    match candidates.len() {
        0 => Err(CliError::user(format!(
            "No .{PROJECT_EXTENSION} file found in {}",
            dir.display()
        ))),
        1 => Ok(candidates.remove(0)),
        _ => Err(CliError::user(format!(
            "Multiple .{PROJECT_EXTENSION} files found in {}. Pass --project",
            dir.display()
        ))),
    }
}
