//! Layered configuration loading

use std::path::{Path, PathBuf};

use dbsync_fs::ConfigStore;
use toml::Value;

use super::SyncConfig;
use crate::{Error, Result};

/// Directory under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "dbsync";

/// File name of the global configuration.
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// File name of the project configuration.
pub const PROJECT_CONFIG_FILE: &str = "dbsync.toml";

/// Resolves [`SyncConfig`] from the global and project layers.
pub struct ConfigResolver {
    project_dir: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver for the project in `project_dir`.
    ///
    /// The global layer lives in:
    /// - Linux: `~/.config/dbsync/`
    /// - macOS: `~/Library/Application Support/dbsync/`
    /// - Windows: `%APPDATA%\dbsync\`
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(project_dir: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            project_dir: project_dir.into(),
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Path of the project layer.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir.join(PROJECT_CONFIG_FILE)
    }

    /// Load and merge every layer.
    ///
    /// Missing layers are skipped. Invalid TOML or invalid values in any
    /// layer produce [`Error::Config`].
    pub fn resolve(&self) -> Result<SyncConfig> {
        let mut merged = Value::Table(Default::default());

        // Layer 1 - Global (<config_dir>/dbsync/config.toml)
        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join(GLOBAL_CONFIG_FILE);
            if global_config_path.is_file() {
                tracing::debug!(?global_config_path, "loading global config (layer 1)");
                merge_values(&mut merged, load_layer(&global_config_path)?);
            } else {
                tracing::debug!(?global_config_path, "no global config (layer 1)");
            }
        }

        // Layer 2 - Project (dbsync.toml)
        let project_config_path = self.project_config_path();
        if project_config_path.is_file() {
            tracing::debug!(?project_config_path, "loading project config (layer 2)");
            merge_values(&mut merged, load_layer(&project_config_path)?);
        }

        merged.try_into().map_err(|e: toml::de::Error| Error::Config {
            message: e.to_string(),
        })
    }
}

fn load_layer(path: &Path) -> Result<Value> {
    ConfigStore::new().load(path).map_err(|err| match err {
        dbsync_fs::Error::ConfigParse { .. } => Error::Config {
            message: err.to_string(),
        },
        other => other.into(),
    })
}

/// Merge `overlay` into `base`; tables merge recursively, anything else
/// is replaced.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base), Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
