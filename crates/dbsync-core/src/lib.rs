//! Synchronization engine for SQL database projects
//!
//! Exports every non-system procedure, function, view, table and trigger of
//! a database into a project directory, rewrites module scripts to `ALTER`
//! form and registers each script in the project manifest exactly once.
//!
//! # Architecture
//!
//! ```text
//!                   dbsync-cli
//!                        |
//!                   dbsync-core
//!   catalog -> sync engine -> backend sessions (one per worker)
//!                   |     \
//!               layout   transform
//!                   |
//!               manifest (ManifestHandle over a ProjectManifest)
//!                        |
//!                    dbsync-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dbsync_core::{NoProgress, SnapshotCatalog, SqlProject, SyncEngine, SyncOptions};
//!
//! let catalog = SnapshotCatalog::open("catalog.json".as_ref())?;
//! let project = SqlProject::load("Sales.sqlproj".as_ref())?;
//! let mut engine = SyncEngine::new(catalog.clone(), catalog.scripter(), project, SyncOptions::default());
//! let report = engine.run(&mut NoProgress)?;
//! println!("{} objects exported", report.exported);
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod model;
pub mod sync;
pub mod transform;

pub use backend::{
    CatalogSnapshot, ScriptEncoding, ScriptJob, ScriptingOptions, ScriptingSession, SessionFactory,
    SnapshotCatalog, SnapshotObject, SnapshotScripter,
};
pub use catalog::{Catalog, CatalogClass, Collection, enumerate_objects, exportable_schemas};
pub use config::{ConfigResolver, SyncConfig};
pub use error::{Error, ObjectFailure, Result};
pub use layout::{DirectoryConvention, resolve};
pub use manifest::{ItemKind, ManifestHandle, ProjectManifest, SqlProject};
pub use model::{DatabaseObject, ObjectKind, ObjectRef, SchemaInfo};
pub use sync::{
    NoProgress, ProgressCounter, ProgressSink, ProgressTick, SyncEngine, SyncOptions, SyncReport,
    SyncState,
};
pub use transform::to_alter_script;
