//! Whole-workspace scenarios: snapshot backend, real `.sqlproj` manifest and
//! configuration files working together.

use std::num::NonZeroUsize;

use dbsync_core::{
    ConfigResolver, ProgressTick, SnapshotCatalog, SqlProject, SyncEngine, SyncOptions, SyncReport, SyncState,
};
use dbsync_fs::checksum::compute_file_checksum;
use dbsync_test_utils::{SnapshotBuilder, TestProject};
use pretty_assertions::assert_eq;

fn sync(project: &TestProject, snapshot: &SnapshotBuilder, options: SyncOptions) -> (dbsync_core::Result<SyncReport>, Vec<ProgressTick>) {
    let path = snapshot.write_to(project.root(), "catalog.json");
    let catalog = SnapshotCatalog::open(&path).unwrap();
    let manifest = SqlProject::load(&project.project_file()).unwrap();
    let mut engine = SyncEngine::new(catalog.clone(), catalog.scripter(), manifest, options);

    let mut ticks: Vec<ProgressTick> = Vec::new();
    let result = engine.run(&mut ticks);
    let expected = if result.is_ok() { SyncState::Done } else { SyncState::Failed };
    assert_eq!(engine.state(), expected);
    (result, ticks)
}

#[test]
fn single_procedure_beside_system_procedure() {
    let project = TestProject::new();
    let snapshot = SnapshotBuilder::with_system_schemas("Sales")
        .schema("sales")
        .procedure("sales", "GetOrders", "CREATE PROC [sales].[GetOrders] AS SELECT 1")
        .system_procedure("sys", "sp_internal");

    let (result, ticks) = sync(&project, &snapshot, SyncOptions::default());
    let report = result.unwrap();

    assert_eq!(ticks, vec![ProgressTick { step: 1, total: 1 }]);
    assert_eq!(report.exported, 1);
    project.assert_file_contains("sales/Stored Procedures/GetOrders.sql", "ALTER PROC [sales].[GetOrders]");
    project.assert_registered("sales\\Stored Procedures\\GetOrders.sql");
    assert_eq!(project.build_item_count(), 1);
    project.assert_file_not_exists("sys");
    assert!(!project.project_content().contains("sp_internal"));
}

#[test]
fn trigger_is_filed_under_parent_schema() {
    let project = TestProject::new();
    let snapshot = SnapshotBuilder::with_system_schemas("Sales")
        .schema("sales")
        .table("sales", "Orders", "CREATE TABLE [sales].[Orders] ([Id] INT)", &[], &[])
        .trigger(
            "sales",
            "Orders",
            "trg_audit",
            "CREATE TRIGGER [sales].[trg_audit] ON [sales].[Orders] AFTER INSERT AS SELECT 1",
        );

    let (result, _) = sync(&project, &snapshot, SyncOptions::default());
    result.unwrap();

    project.assert_file_contains("sales/Triggers/trg_audit.sql", "ALTER TRIGGER [sales].[trg_audit]");
    project.assert_registered("sales\\Triggers\\trg_audit.sql");
    project.assert_file_contains("sales/Tables/Orders.sql", "CREATE TABLE [sales].[Orders]");
}

#[test]
fn rerun_keeps_items_and_script_content() {
    let project = TestProject::new();
    let snapshot = SnapshotBuilder::with_system_schemas("Sales")
        .schema("sales")
        .procedure("sales", "GetOrders", "CREATE PROCEDURE [sales].[GetOrders] AS SELECT 1")
        .view("dbo", "OpenOrders", "CREATE VIEW [dbo].[OpenOrders] AS SELECT 1");
    let script = project.root().join("dbo/Views/OpenOrders.sql");

    let (first, _) = sync(&project, &snapshot, SyncOptions::default());
    let first = first.unwrap();
    let items = project.build_item_count();
    let checksum = compute_file_checksum(&script).unwrap();

    let (second, _) = sync(&project, &snapshot, SyncOptions::default());
    let second = second.unwrap();

    assert_eq!(first.items_added, 2);
    assert_eq!(second.items_added, 0);
    assert_eq!(second.folders_added, 0);
    assert_eq!(second.files_unchanged, 2);
    assert!(second.is_noop());
    assert_eq!(project.build_item_count(), items);
    assert_eq!(compute_file_checksum(&script).unwrap(), checksum);
}

#[test]
fn one_failure_does_not_stop_the_rest() {
    let project = TestProject::new();
    project.write_file("dbsync.toml", "[scripting]\ncontinue_on_error = false\n\n[engine]\nparallelism = 2\n");
    let snapshot = SnapshotBuilder::with_system_schemas("Sales")
        .schema("sales")
        .procedure("sales", "GetOrders", "CREATE PROCEDURE [sales].[GetOrders] AS SELECT 1")
        .function("sales", "fn_total", "CREATE FUNCTION [sales].[fn_total]() RETURNS INT AS BEGIN RETURN 1 END")
        .object("view", "sales", "Broken", None);

    let config = ConfigResolver::with_global_config_dir(project.root(), project.root().join("no-global"))
        .resolve()
        .unwrap();
    let options = config.sync_options();
    assert_eq!(options.parallelism, NonZeroUsize::new(2));

    let (result, ticks) = sync(&project, &snapshot, options);
    let err = result.unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].object, "view [sales].[Broken]");
    assert!(err.to_string().contains("view [sales].[Broken]"));
    assert_eq!(ticks.len(), 3);
    project.assert_registered("sales\\Stored Procedures\\GetOrders.sql");
    project.assert_registered("sales\\Functions\\fn_total.sql");
    assert!(!project.project_content().contains("Broken"));
}
