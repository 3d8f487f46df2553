//! Error types for dbsync-core

use std::path::PathBuf;

/// Result type for dbsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dbsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database handle could not be established or was lost
    #[error("Connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    /// Saving the project manifest failed
    #[error("Failed to save project {path}: {message}")]
    ManifestPersist { path: PathBuf, message: String },

    /// The project directory skeleton could not be created or registered
    #[error("Failed to prepare project structure at {path}: {message}")]
    Structure { path: String, message: String },

    /// One or more objects failed to export
    #[error("{}", format_failures(failures))]
    Export {
        exported: usize,
        failures: Vec<ObjectFailure>,
    },

    /// The scripting backend could not script an object
    #[error("Scripting failed: {message}")]
    Scripting { message: String },

    /// An object has no schema to place it under
    #[error("No owning schema")]
    MissingSchema,

    /// Two objects resolve to the same project path
    #[error("Resolves to {path}, already claimed by {claimed_by}")]
    PathCollision { path: String, claimed_by: String },

    /// The project file is malformed
    #[error("Invalid project file {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from dbsync-fs
    #[error(transparent)]
    Fs(#[from] dbsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts the whole run rather than one object.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Structure { .. } | Self::ManifestPersist { .. }
        )
    }

    pub fn connection(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn scripting(message: impl ToString) -> Self {
        Self::Scripting {
            message: message.to_string(),
        }
    }

    /// The individual object failures, if this is an aggregated export error.
    pub fn failures(&self) -> &[ObjectFailure] {
        match self {
            Self::Export { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// A failure scoped to a single exported object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFailure {
    /// Display identity, e.g. `procedure [sales].[GetOrders]`
    pub object: String,
    pub message: String,
}

impl ObjectFailure {
    pub fn new(object: impl ToString, error: &Error) -> Self {
        Self {
            object: object.to_string(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for ObjectFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.object, self.message)
    }
}

fn format_failures(failures: &[ObjectFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
