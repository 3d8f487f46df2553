//! Filesystem layer for dbsync
//!
//! Provides project-relative path handling, file-name sanitization and
//! atomic I/O operations shared by the sync engine and the CLI.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::{NormalizedPath, is_invalid_file_name_char, sanitize_file_name};
