//! Project directory convention and path resolution
//!
//! Every exported object lands at `{schema}/{type directory}/{name}.sql`.
//! The structure phase and per-object resolution both read the same
//! [`DirectoryConvention`], so directories created up front always match the
//! paths objects are written to.

use dbsync_fs::path::REPLACEMENT_CHAR;
use dbsync_fs::{NormalizedPath, sanitize_file_name};

use crate::model::ObjectKind;

/// Extension of generated script files.
pub const SCRIPT_EXTENSION: &str = "sql";

/// Fixed mapping from object kind to its project directory name.
pub struct DirectoryConvention;

impl DirectoryConvention {
    /// Directory name for an object kind.
    pub fn directory(kind: ObjectKind) -> &'static str {
        match kind {
            ObjectKind::Procedure => "Stored Procedures",
            ObjectKind::Function => "Functions",
            ObjectKind::View => "Views",
            ObjectKind::Table => "Tables",
            ObjectKind::Trigger => "Triggers",
        }
    }

    /// All `(kind, directory)` entries, in [`ObjectKind::ALL`] order.
    pub fn entries() -> impl Iterator<Item = (ObjectKind, &'static str)> {
        ObjectKind::ALL
            .into_iter()
            .map(|kind| (kind, Self::directory(kind)))
    }
}

/// Directory name of a schema.
///
/// Sanitized like a file name; a name made only of dots would step out of
/// the project, so each dot becomes the replacement character.
fn schema_directory(schema: &str) -> String {
    let sanitized = sanitize_file_name(schema);
    if !sanitized.is_empty() && sanitized.chars().all(|c| c == '.') {
        return REPLACEMENT_CHAR.to_string().repeat(sanitized.len());
    }
    sanitized
}

/// Project folder of a schema, e.g. `sales`.
pub fn schema_folder(schema: &str) -> NormalizedPath {
    NormalizedPath::from_segments([schema_directory(schema)])
}

/// Project folder of one object kind within a schema, e.g. `sales/Views`.
pub fn type_folder(schema: &str, kind: ObjectKind) -> NormalizedPath {
    NormalizedPath::from_segments([schema_directory(schema).as_str(), DirectoryConvention::directory(kind)])
}

/// Resolve the project-relative script path of an object.
///
/// Schema and object name are both sanitized, so the result always has three
/// segments. Two names that sanitize identically resolve to the same path.
pub fn resolve(kind: ObjectKind, schema: &str, name: &str) -> NormalizedPath {
    let file_name = format!("{}.{}", sanitize_file_name(name), SCRIPT_EXTENSION);
    NormalizedPath::from_segments([
        schema_directory(schema).as_str(),
        DirectoryConvention::directory(kind),
        &file_name,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(ObjectKind::Procedure, "sales/Stored Procedures/GetOrders.sql")]
    #[case(ObjectKind::Function, "sales/Functions/GetOrders.sql")]
    #[case(ObjectKind::View, "sales/Views/GetOrders.sql")]
    #[case(ObjectKind::Table, "sales/Tables/GetOrders.sql")]
    #[case(ObjectKind::Trigger, "sales/Triggers/GetOrders.sql")]
    fn resolves_by_kind(#[case] kind: ObjectKind, #[case] expected: &str) {
        assert_eq!(resolve(kind, "sales", "GetOrders").as_str(), expected);
    }

    #[test]
    fn convention_has_one_entry_per_kind() {
        let kinds: HashSet<_> = DirectoryConvention::entries().map(|(k, _)| k).collect();
        let dirs: HashSet<_> = DirectoryConvention::entries().map(|(_, d)| d).collect();
        assert_eq!(kinds.len(), ObjectKind::ALL.len());
        assert_eq!(dirs.len(), ObjectKind::ALL.len());
    }

    #[test]
    fn type_folder_matches_resolved_parent() {
        for kind in ObjectKind::ALL {
            let path = resolve(kind, "dbo", "x");
            assert!(path.as_str().starts_with(&format!("{}/", type_folder("dbo", kind))));
        }
    }

    #[test]
    fn invalid_characters_are_replaced() {
        let path = resolve(ObjectKind::View, "dbo", "a/b");
        assert_eq!(path.as_str(), "dbo/Views/a_b.sql");
    }

    #[rstest]
    #[case("sales/archive", "sales_archive/Views/v.sql")]
    #[case("sales\\archive", "sales_archive/Views/v.sql")]
    #[case("..", "__/Views/v.sql")]
    #[case(".", "_/Views/v.sql")]
    #[case("..hidden", "..hidden/Views/v.sql")]
    fn schema_segment_stays_inside_project(#[case] schema: &str, #[case] expected: &str) {
        assert_eq!(resolve(ObjectKind::View, schema, "v").as_str(), expected);
        assert!(expected.starts_with(schema_folder(schema).as_str()));
    }

    #[test]
    fn sanitized_collisions_are_not_resolved() {
        let a = resolve(ObjectKind::View, "dbo", "a/b");
        let b = resolve(ObjectKind::View, "dbo", "a_b");
        assert_eq!(a, b);
    }
}
