//! Scripting backend abstraction
//!
//! A [`SessionFactory`] opens one [`ScriptingSession`] per worker. Sessions
//! carry connection-affine state, so they are created inside the worker
//! thread that uses them and are never shared or handed over between workers.

mod snapshot;

pub use snapshot::{CatalogSnapshot, SnapshotCatalog, SnapshotObject, SnapshotScripter, SnapshotSession};

use std::path::PathBuf;

use dbsync_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::model::DatabaseObject;

/// Text encoding of generated scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptEncoding {
    #[default]
    #[serde(rename = "utf8")]
    Utf8,
    /// UTF-8 with a byte order mark
    #[serde(rename = "utf8-bom")]
    Utf8Bom,
}

/// Options handed to the scripting backend for every object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingOptions {
    /// Prefix the script with a `USE [database]` batch
    pub include_database_context: bool,
    /// Emit what can be scripted instead of failing on recoverable problems
    pub continue_on_error: bool,
    /// Include declarative referential integrity (keys, checks, defaults)
    pub include_dri: bool,
    pub include_indexes: bool,
    pub encoding: ScriptEncoding,
    /// Write the script to the target file only
    pub to_file_only: bool,
}

impl Default for ScriptingOptions {
    fn default() -> Self {
        Self {
            include_database_context: true,
            continue_on_error: true,
            include_dri: true,
            include_indexes: true,
            encoding: ScriptEncoding::Utf8,
            to_file_only: true,
        }
    }
}

/// The export unit of one object.
#[derive(Debug, Clone)]
pub struct ScriptJob {
    pub object: DatabaseObject,
    /// Project-relative script path
    pub relative_path: NormalizedPath,
    /// Absolute file the backend writes to
    pub target_path: PathBuf,
    pub options: ScriptingOptions,
}

impl ScriptJob {
    pub fn new(
        object: DatabaseObject,
        relative_path: NormalizedPath,
        target_path: PathBuf,
        options: ScriptingOptions,
    ) -> Self {
        Self {
            object,
            relative_path,
            target_path,
            options,
        }
    }
}

/// A per-worker scripting session.
pub trait ScriptingSession {
    /// Render `job.object` as DDL and write it to `job.target_path`.
    fn script(&mut self, job: &ScriptJob) -> Result<()>;
}

/// Opens scripting sessions; shared by reference across workers.
pub trait SessionFactory: Sync {
    type Session: ScriptingSession;

    /// Open a session for the worker with the given index.
    ///
    /// Any error is treated as a connection failure and aborts the run.
    fn connect(&self, worker: usize) -> Result<Self::Session>;
}
