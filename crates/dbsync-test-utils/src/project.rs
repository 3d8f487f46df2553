//! [`TestProject`] fixture for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name of the fixture project.
pub const PROJECT_FILE: &str = "Sales.sqlproj";

/// Minimal SQL database project with no items.
pub const EMPTY_PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003" ToolsVersion="4.0">
  <PropertyGroup>
    <Name>Sales</Name>
    <DSP>Microsoft.Data.Tools.Schema.Sql.Sql150DatabaseSchemaProvider</DSP>
  </PropertyGroup>
  <Import Project="$(MSBuildExtensionsPath)\Microsoft\VisualStudio\v11.0\SSDT\Microsoft.Data.Tools.Schema.SqlTasks.targets" />
</Project>
"#;

/// A temporary project directory holding a `.sqlproj` file.
///
/// # Example
///
/// ```rust,no_run
/// use dbsync_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_file("catalog.json", "{}");
/// project.assert_file_exists("Sales.sqlproj");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create a directory with an empty project file.
    pub fn new() -> Self {
        Self::with_content(EMPTY_PROJECT)
    }

    /// Create a directory with a project file of the given content.
    pub fn with_content(content: &str) -> Self {
        let project = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        project.write_file(PROJECT_FILE, content);
        project
    }

    /// Project base directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the `.sqlproj` file.
    pub fn project_file(&self) -> PathBuf {
        self.root().join(PROJECT_FILE)
    }

    /// Current content of the `.sqlproj` file.
    pub fn project_content(&self) -> String {
        self.read_file(PROJECT_FILE)
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_file(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Number of `<Build Include=...>` elements in the project file.
    pub fn build_item_count(&self) -> usize {
        self.project_content().matches("<Build Include=").count()
    }

    /// Number of `<Folder Include=...>` elements in the project file.
    pub fn folder_count(&self) -> usize {
        self.project_content().matches("<Folder Include=").count()
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(!full_path.exists(), "Expected file NOT to exist: {}", full_path.display());
    }

    /// Assert that the file at `path` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }

    /// Assert that the project file registers `include` (Windows separators).
    ///
    /// # Panics
    /// Panics if the include is missing.
    pub fn assert_registered(&self, include: &str) {
        let content = self.project_content();
        assert!(
            content.contains(&format!("Include=\"{include}\"")),
            "Project does not register {include}:\n{content}"
        );
    }
}
