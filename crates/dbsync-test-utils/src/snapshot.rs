//! [`SnapshotBuilder`] for catalog snapshot documents.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

/// Builds the JSON catalog snapshot read by the snapshot backend.
///
/// # Example
///
/// ```rust
/// use dbsync_test_utils::SnapshotBuilder;
///
/// let json = SnapshotBuilder::new("Sales")
///     .schema("sales")
///     .procedure("sales", "GetOrders", "CREATE PROC [sales].[GetOrders] AS SELECT 1")
///     .system_procedure("sys", "sp_internal")
///     .to_json();
/// assert!(json.contains("GetOrders"));
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    database: String,
    schemas: Vec<Value>,
    objects: Vec<Value>,
}

impl SnapshotBuilder {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            schemas: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Snapshot with the standard system schemas (`dbo`, `sys`,
    /// `INFORMATION_SCHEMA`) already present.
    pub fn with_system_schemas(database: &str) -> Self {
        Self::new(database)
            .system_schema("dbo")
            .system_schema("sys")
            .system_schema("INFORMATION_SCHEMA")
    }

    pub fn schema(mut self, name: &str) -> Self {
        self.schemas.push(json!({ "name": name }));
        self
    }

    pub fn system_schema(mut self, name: &str) -> Self {
        self.schemas.push(json!({ "name": name, "is_system": true }));
        self
    }

    /// Add an arbitrary object entry.
    pub fn object(mut self, kind: &str, schema: &str, name: &str, definition: Option<&str>) -> Self {
        let mut object = Map::new();
        object.insert("kind".into(), json!(kind));
        object.insert("schema".into(), json!(schema));
        object.insert("name".into(), json!(name));
        if let Some(definition) = definition {
            object.insert("definition".into(), json!(definition));
        }
        self.objects.push(Value::Object(object));
        self
    }

    pub fn procedure(self, schema: &str, name: &str, definition: &str) -> Self {
        self.object("procedure", schema, name, Some(definition))
    }

    pub fn function(self, schema: &str, name: &str, definition: &str) -> Self {
        self.object("function", schema, name, Some(definition))
    }

    pub fn view(self, schema: &str, name: &str, definition: &str) -> Self {
        self.object("view", schema, name, Some(definition))
    }

    /// Add a table with optional constraints and indexes.
    pub fn table(mut self, schema: &str, name: &str, definition: &str, constraints: &[&str], indexes: &[&str]) -> Self {
        self.objects.push(json!({
            "kind": "table",
            "schema": schema,
            "name": name,
            "definition": definition,
            "constraints": constraints,
            "indexes": indexes,
        }));
        self
    }

    /// Add a trigger owned by the table `schema.parent`.
    pub fn trigger(mut self, schema: &str, parent: &str, name: &str, definition: &str) -> Self {
        self.objects.push(json!({
            "kind": "trigger",
            "name": name,
            "parent": { "kind": "table", "schema": schema, "name": parent },
            "definition": definition,
        }));
        self
    }

    pub fn system_procedure(mut self, schema: &str, name: &str) -> Self {
        self.objects.push(json!({
            "kind": "procedure",
            "schema": schema,
            "name": name,
            "is_system": true,
            "definition": format!("CREATE PROCEDURE [{schema}].[{name}] AS RETURN 0"),
        }));
        self
    }

    pub fn to_value(&self) -> Value {
        json!({
            "database": self.database,
            "schemas": self.schemas,
            "objects": self.objects,
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap()
    }

    /// Write the snapshot to `dir/file_name` and return its path.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.to_json()).unwrap();
        path
    }
}
