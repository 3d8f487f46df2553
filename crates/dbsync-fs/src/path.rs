//! Normalized path handling for project-relative item paths

use std::path::{Path, PathBuf};

/// Replacement for characters that cannot appear in a file name.
pub const REPLACEMENT_CHAR: char = '_';

/// A path normalized to use forward slashes internally.
///
/// Project items are addressed by relative paths such as
/// `sales/Stored Procedures/GetOrders.sql`. The forward-slash form is used
/// for comparisons and logging; [`NormalizedPath::under`] resolves it on disk
/// and [`NormalizedPath::to_windows`] renders the backslash form MSBuild
/// project files use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Build a relative path from individual segments.
    ///
    /// Segments are joined verbatim; they are not sanitized.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let inner = segments
            .into_iter()
            .map(|s| s.as_ref().replace('\\', "/"))
            .collect::<Vec<_>>()
            .join("/");
        Self { inner }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Render with backslash separators.
    pub fn to_windows(&self) -> String {
        self.inner.replace('/', "\\")
    }

    /// Resolve this path against a base directory on disk.
    pub fn under(&self, base: &Path) -> PathBuf {
        self.inner
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
    }

    /// Key used to compare project item paths.
    ///
    /// Project items are matched case-insensitively, regardless of separator
    /// style or trailing separators.
    pub fn item_key(&self) -> String {
        self.inner.trim_end_matches('/').to_lowercase()
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Whether `c` is rejected in a file name on this platform.
#[cfg(windows)]
pub fn is_invalid_file_name_char(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/') || (c as u32) < 32
}

/// Whether `c` is rejected in a file name on this platform.
///
/// Backslash is rejected everywhere since project includes use it as the
/// separator.
#[cfg(not(windows))]
pub fn is_invalid_file_name_char(c: char) -> bool {
    matches!(c, '/' | '\\' | '\0')
}

/// Replace every character that is invalid in a file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if is_invalid_file_name_char(c) {
                REPLACEMENT_CHAR
            } else {
                c
            }
        })
        .collect()
}
