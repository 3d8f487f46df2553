//! Property-based tests for path resolution and script rewriting

use dbsync_core::{ObjectKind, resolve, to_alter_script};
use dbsync_fs::is_invalid_file_name_char;
use proptest::prelude::*;

fn module_kind() -> impl Strategy<Value = (ObjectKind, &'static str)> {
    prop_oneof![
        Just((ObjectKind::Procedure, "PROC")),
        Just((ObjectKind::Procedure, "PROCEDURE")),
        Just((ObjectKind::Function, "FUNCTION")),
        Just((ObjectKind::View, "VIEW")),
        Just((ObjectKind::Trigger, "TRIGGER")),
    ]
}

fn any_kind() -> impl Strategy<Value = ObjectKind> {
    prop::sample::select(ObjectKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn resolve_is_deterministic(kind in any_kind(), schema in "[a-z]{1,8}", name in "\\PC{1,30}") {
        prop_assert_eq!(resolve(kind, &schema, &name), resolve(kind, &schema, &name));
    }

    #[test]
    fn resolved_file_name_has_no_invalid_chars(kind in any_kind(), name in "\\PC{1,30}") {
        let path = resolve(kind, "dbo", &name);
        let file_name = path.as_str().rsplit('/').next().unwrap();
        prop_assert!(!file_name.chars().any(is_invalid_file_name_char));
        prop_assert!(file_name.ends_with(".sql"));
    }

    #[test]
    fn resolved_path_has_three_segments(kind in any_kind(), name in "[A-Za-z0-9_ /\\\\]{1,20}") {
        let path = resolve(kind, "sales", &name);
        prop_assert_eq!(path.as_str().split('/').count(), 3);
        prop_assert!(path.as_str().starts_with("sales/"));
    }

    #[test]
    fn schema_never_leaves_the_project(kind in any_kind(), schema in "[A-Za-z0-9_ ./\\\\]{1,12}") {
        let path = resolve(kind, &schema, "x");
        let segments: Vec<&str> = path.as_str().split('/').collect();
        prop_assert_eq!(segments.len(), 3);
        prop_assert!(segments[0] != "." && segments[0] != "..");
    }

    #[test]
    fn only_the_first_marker_changes(
        (kind, keyword) in module_kind(),
        prefix in "[a-m0-9 \n]{0,20}",
        gap in "[ \t\n]{1,4}",
        body in "[a-m0-9 ]{0,40}",
        lowercase in any::<bool>(),
    ) {
        let create = if lowercase { "create" } else { "CREATE" };
        let script = format!("-- {prefix}\n{create}{gap}{keyword} x AS {body}\nGO\nCREATE {keyword} y");
        let expected = format!("-- {prefix}\nALTER{gap}{keyword} x AS {body}\nGO\nCREATE {keyword} y");
        prop_assert_eq!(to_alter_script(&script, kind).into_owned(), expected);
    }

    #[test]
    fn tables_are_never_rewritten(script in "\\PC{0,80}") {
        prop_assert_eq!(to_alter_script(&script, ObjectKind::Table).into_owned(), script);
    }

    #[test]
    fn text_without_marker_is_unchanged((kind, _) in module_kind(), script in "[a-qs-z0-9 \n]{0,80}") {
        prop_assert_eq!(to_alter_script(&script, kind).into_owned(), script);
    }
}
