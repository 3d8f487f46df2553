//! Configuration resolution
//!
//! Settings are read from optional TOML files, merged in order (later
//! sources override earlier ones, tables merge key by key):
//!
//! 1. **Global** - `<config_dir>/dbsync/config.toml`
//! 2. **Project** - `dbsync.toml` beside the project file
//!
//! ```toml
//! [source]
//! snapshot = "catalog.json"
//!
//! [engine]
//! parallelism = 4
//!
//! [scripting]
//! include_indexes = false
//! encoding = "utf8-bom"
//! ```

mod resolver;

pub use resolver::{CONFIG_DIR_NAME, ConfigResolver, GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE};

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::ScriptingOptions;
use crate::sync::SyncOptions;

/// Effective configuration after merging every source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub source: SourceConfig,
    pub engine: EngineConfig,
    pub scripting: ScriptingOptions,
}

/// Where the database is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Catalog snapshot file, relative to the project directory
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker count; host parallelism when unset
    pub parallelism: Option<NonZeroUsize>,
}

impl SyncConfig {
    /// Absolute snapshot path, resolved against `project_dir`.
    pub fn snapshot_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.source.snapshot.as_ref().map(|path| project_dir.join(path))
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            parallelism: self.engine.parallelism,
            scripting: self.scripting.clone(),
        }
    }
}
