//! Project manifest access
//!
//! A [`ProjectManifest`] is the project's list of included folders and
//! files. Implementations are not expected to be safe for concurrent
//! mutation or to deduplicate entries; [`ManifestHandle`] wraps one behind a
//! single read/write lock and exposes the narrow API the sync engine uses.

mod sqlproj;

pub use sqlproj::SqlProject;

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use dbsync_fs::NormalizedPath;

use crate::Result;

/// Type of a manifest item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// An included folder
    Folder,
    /// A script compiled into the project
    Build,
}

impl ItemKind {
    /// MSBuild item element name.
    pub fn element(self) -> &'static str {
        match self {
            ItemKind::Folder => "Folder",
            ItemKind::Build => "Build",
        }
    }
}

/// An external project manifest.
pub trait ProjectManifest: Send + Sync {
    /// Directory that relative item paths are resolved against.
    fn directory(&self) -> &Path;

    /// Whether an item with this relative path is registered.
    fn has_path(&self, path: &NormalizedPath) -> bool;

    /// Register an item. Does not check for duplicates.
    fn add_item(&mut self, kind: ItemKind, path: &NormalizedPath) -> Result<()>;

    /// Persist all pending additions.
    fn save(&mut self) -> Result<()>;
}

/// Lock-guarded access to a [`ProjectManifest`].
///
/// Lookups take the read lock and may run alongside each other; additions
/// and `save` take the write lock. Additions re-check registration under the
/// write lock, so concurrent callers never register a path twice.
pub struct ManifestHandle<M> {
    inner: RwLock<M>,
    directory: PathBuf,
}

impl<M: ProjectManifest> ManifestHandle<M> {
    pub fn new(manifest: M) -> Self {
        let directory = manifest.directory().to_path_buf();
        Self {
            inner: RwLock::new(manifest),
            directory,
        }
    }

    /// Project base directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Absolute location of a relative item path.
    pub fn absolute_path(&self, path: &NormalizedPath) -> PathBuf {
        path.under(&self.directory)
    }

    /// Whether `path` is already registered.
    pub fn has_item(&self, path: &NormalizedPath) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_path(path)
    }

    /// Register a folder unless present. Returns whether it was added.
    pub fn add_folder(&self, path: &NormalizedPath) -> Result<bool> {
        self.add_if_missing(ItemKind::Folder, path)
    }

    /// Register a build item unless present. Returns whether it was added.
    pub fn add_build_item(&self, path: &NormalizedPath) -> Result<bool> {
        self.add_if_missing(ItemKind::Build, path)
    }

    /// Persist the manifest.
    pub fn save(&self) -> Result<()> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .save()
    }

    /// Release the wrapped manifest.
    pub fn into_inner(self) -> M {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn add_if_missing(&self, kind: ItemKind, path: &NormalizedPath) -> Result<bool> {
        let mut manifest = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if manifest.has_path(path) {
            return Ok(false);
        }
        manifest.add_item(kind, path)?;
        tracing::debug!(kind = kind.element(), path = %path, "registered project item");
        Ok(true)
    }
}
