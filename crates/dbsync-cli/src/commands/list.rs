//! List command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use dbsync_core::{DatabaseObject, ObjectKind, SnapshotCatalog, enumerate_objects, resolve};

use crate::cli::ListArgs;
use crate::context::ProjectContext;
use crate::error::Result;

/// One exportable object and where its script goes.
#[derive(Debug, Serialize)]
pub struct ListedObject {
    pub kind: ObjectKind,
    pub schema: Option<String>,
    pub name: String,
    /// Project-relative script path; `None` when the schema is unknown
    pub path: Option<String>,
}

impl From<DatabaseObject> for ListedObject {
    fn from(object: DatabaseObject) -> Self {
        let schema = object.owning_schema().ok().map(str::to_string);
        let path = schema
            .as_deref()
            .map(|schema| resolve(object.kind, schema, &object.name).to_string());
        Self {
            kind: object.kind,
            schema,
            name: object.name,
            path,
        }
    }
}

/// Run the list command
///
/// Prints every exportable object without touching the project.
pub fn run_list(cwd: &Path, args: &ListArgs) -> Result<()> {
    let context = ProjectContext::resolve(cwd, &args.source)?;
    let catalog = SnapshotCatalog::open(&context.snapshot)?;

    let mut objects: Vec<ListedObject> = enumerate_objects(&catalog)?
        .into_iter()
        .map(ListedObject::from)
        .collect();
    objects.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&objects)?);
        return Ok(());
    }

    if objects.is_empty() {
        println!("{}", "No exportable objects.".dimmed());
        return Ok(());
    }

    for object in &objects {
        let path = object.path.as_deref().unwrap_or("<no schema>");
        println!("{:<10} {}", object.kind.as_str().cyan(), path);
    }
    println!();
    println!("{} objects", objects.len().to_string().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsync_core::ObjectRef;

    #[test]
    fn listed_trigger_uses_parent_schema() {
        let trigger = DatabaseObject::trigger("trg_audit", ObjectRef::new(ObjectKind::Table, "sales", "Orders"));
        let listed = ListedObject::from(trigger);

        assert_eq!(listed.schema.as_deref(), Some("sales"));
        assert_eq!(listed.path.as_deref(), Some("sales/Triggers/trg_audit.sql"));
    }

    #[test]
    fn object_without_schema_has_no_path() {
        let listed = ListedObject::from(DatabaseObject::new(ObjectKind::View, "", "v"));
        assert!(listed.path.is_none());
    }
}
