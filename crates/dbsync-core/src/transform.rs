//! Rewrites generated `CREATE` scripts into `ALTER` scripts

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::model::ObjectKind;

/// Script tokens that may hide a `CREATE` keyword, plus the keyword itself.
///
/// Comments, bracketed identifiers and string literals are consumed whole so
/// only a bare `CREATE <module>` (capture group 1) is ever rewritten.
static SCRIPT_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)/\*.*?\*/|--[^\n]*|\[(?:[^\]]|\]\])*\]|'(?:[^']|'')*'|"(?:[^"]|"")*"|\b(CREATE)\s+(?:PROCEDURE|PROC|FUNCTION|VIEW|TRIGGER)\b"#,
    )
    .unwrap()
});

/// Rewrite a generated script so re-applying it alters the object in place.
///
/// Only the first bare `CREATE <PROC|FUNCTION|VIEW|TRIGGER>` statement is
/// changed to `ALTER`; every other byte is preserved. Table scripts are
/// returned unchanged.
pub fn to_alter_script(script: &str, kind: ObjectKind) -> Cow<'_, str> {
    if !kind.supports_alter() {
        return Cow::Borrowed(script);
    }

    let Some(keyword) = SCRIPT_TOKENS.captures_iter(script).find_map(|caps| caps.get(1)) else {
        return Cow::Borrowed(script);
    };

    let mut altered = String::with_capacity(script.len());
    altered.push_str(&script[..keyword.start()]);
    altered.push_str("ALTER");
    altered.push_str(&script[keyword.end()..]);
    Cow::Owned(altered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ObjectKind::Procedure, "CREATE PROCEDURE dbo.p AS SELECT 1", "ALTER PROCEDURE dbo.p AS SELECT 1")]
    #[case(ObjectKind::Procedure, "create proc dbo.p as select 1", "ALTER proc dbo.p as select 1")]
    #[case(ObjectKind::Function, "CREATE FUNCTION dbo.f() RETURNS INT", "ALTER FUNCTION dbo.f() RETURNS INT")]
    #[case(ObjectKind::View, "CREATE VIEW [dbo].[v] AS SELECT 1", "ALTER VIEW [dbo].[v] AS SELECT 1")]
    #[case(ObjectKind::Trigger, "CREATE TRIGGER t ON dbo.T AFTER INSERT", "ALTER TRIGGER t ON dbo.T AFTER INSERT")]
    fn rewrites_module_scripts(#[case] kind: ObjectKind, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_alter_script(input, kind), expected);
    }

    #[test]
    fn preserves_whitespace_between_tokens() {
        let script = "SET ANSI_NULLS ON\nGO\nCREATE\n\tVIEW v AS SELECT 1";
        assert_eq!(
            to_alter_script(script, ObjectKind::View),
            "SET ANSI_NULLS ON\nGO\nALTER\n\tVIEW v AS SELECT 1"
        );
    }

    #[test]
    fn replaces_only_first_marker() {
        let script = "CREATE PROC a AS EXEC('CREATE VIEW x AS SELECT 1')";
        assert_eq!(
            to_alter_script(script, ObjectKind::Procedure),
            "ALTER PROC a AS EXEC('CREATE VIEW x AS SELECT 1')"
        );
    }

    #[test]
    fn marker_need_not_start_a_line() {
        let script = "/* header */ CREATE FUNCTION f() RETURNS INT AS BEGIN RETURN 1 END";
        assert!(to_alter_script(script, ObjectKind::Function).starts_with("/* header */ ALTER FUNCTION"));
    }

    #[test]
    fn ignores_create_inside_identifiers() {
        let script = "EXEC usp_CREATE VIEW_log";
        assert_eq!(to_alter_script(script, ObjectKind::Procedure), script);
    }

    #[test]
    fn ignores_create_table() {
        let script = "CREATE TABLE t (id INT)\nGO\nCREATE TRIGGER trg ON t AFTER INSERT AS SELECT 1";
        assert_eq!(
            to_alter_script(script, ObjectKind::Trigger),
            "CREATE TABLE t (id INT)\nGO\nALTER TRIGGER trg ON t AFTER INSERT AS SELECT 1"
        );
    }

    #[test]
    fn skips_keywords_inside_header_comment() {
        let script = "USE [Sales]\nGO\n/****** Object:  StoredProcedure [sales].[Create View Log] ******/\n\
                      SET ANSI_NULLS ON\nGO\nCREATE PROCEDURE [sales].[Create View Log] AS SELECT 1\nGO\n";
        let expected = script.replace("CREATE PROCEDURE", "ALTER PROCEDURE");
        assert_eq!(to_alter_script(script, ObjectKind::Procedure), expected);
    }

    #[rstest]
    #[case("-- create view of orders\nCREATE VIEW v AS SELECT 1", "-- create view of orders\nALTER VIEW v AS SELECT 1")]
    #[case("/* CREATE\nVIEW old */ CREATE VIEW v AS SELECT 1", "/* CREATE\nVIEW old */ ALTER VIEW v AS SELECT 1")]
    #[case("PRINT 'create view';\nCREATE VIEW v AS SELECT 1", "PRINT 'create view';\nALTER VIEW v AS SELECT 1")]
    #[case("CREATE VIEW [create view] AS SELECT 1", "ALTER VIEW [create view] AS SELECT 1")]
    fn skips_comments_literals_and_brackets(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_alter_script(input, ObjectKind::View), expected);
    }

    #[test]
    fn marker_only_in_comment_is_borrowed() {
        let script = "/* CREATE PROCEDURE p */ SELECT 1";
        assert!(matches!(to_alter_script(script, ObjectKind::Procedure), Cow::Borrowed(_)));
    }

    #[test]
    fn table_scripts_are_untouched() {
        let script = "CREATE TABLE [dbo].[T] (id INT)\nGO\nCREATE VIEW v AS SELECT 1";
        let result = to_alter_script(script, ObjectKind::Table);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, script);
    }

    #[test]
    fn script_without_marker_is_borrowed() {
        let script = "CREATE OR ALTER VIEW v AS SELECT 1";
        assert!(matches!(to_alter_script(script, ObjectKind::View), Cow::Borrowed(_)));
    }
}
