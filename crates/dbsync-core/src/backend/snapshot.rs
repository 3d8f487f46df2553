//! Catalog snapshot backend
//!
//! Serves a database from a JSON document instead of a live server. The
//! document lists the schemas and every object with its stored definition:
//!
//! ```json
//! {
//!   "database": "Sales",
//!   "schemas": [{ "name": "sales" }, { "name": "dbo", "is_system": true }],
//!   "objects": [
//!     { "kind": "table", "schema": "sales", "name": "Orders",
//!       "definition": "CREATE TABLE [sales].[Orders] (...)",
//!       "constraints": ["ALTER TABLE ... ADD CONSTRAINT ..."],
//!       "indexes": ["CREATE INDEX ..."] },
//!     { "kind": "trigger", "name": "trg_audit",
//!       "parent": { "kind": "table", "schema": "sales", "name": "Orders" },
//!       "definition": "CREATE TRIGGER ..." }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::marker::PhantomData;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use dbsync_fs::{ConfigStore, io};
use serde::{Deserialize, Serialize};

use super::{ScriptEncoding, ScriptJob, ScriptingOptions, ScriptingSession, SessionFactory};
use crate::catalog::{Catalog, CatalogClass, Collection};
use crate::model::{DatabaseObject, ObjectKind, SchemaInfo};
use crate::{Error, Result};

/// Batch separator.
const GO: &str = "GO";

/// Serialized description of one database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub database: String,
    #[serde(default)]
    pub schemas: Vec<SchemaInfo>,
    #[serde(default)]
    pub objects: Vec<SnapshotObject>,
}

/// An object together with its stored DDL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotObject {
    #[serde(flatten)]
    pub object: DatabaseObject,
    /// `CREATE` statement of the object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Table constraints scripted with DRI
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<String>,
}

impl CatalogSnapshot {
    /// Load a snapshot file.
    ///
    /// A snapshot that cannot be read or parsed is reported as a connection
    /// failure, like an unreachable server.
    pub fn load(path: &Path) -> Result<Self> {
        ConfigStore::new()
            .load(path)
            .map_err(|err| Error::connection(path.display().to_string(), err))
    }
}

/// [`Catalog`] over a loaded snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCatalog {
    snapshot: Arc<CatalogSnapshot>,
}

impl SnapshotCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    /// Load a snapshot file and serve it.
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = CatalogSnapshot::load(path)?;
        tracing::info!(
            path = %path.display(),
            database = %snapshot.database,
            objects = snapshot.objects.len(),
            "opened catalog snapshot"
        );
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Session factory scripting objects of this snapshot.
    pub fn scripter(&self) -> SnapshotScripter {
        SnapshotScripter {
            snapshot: Arc::clone(&self.snapshot),
        }
    }

    fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &DatabaseObject> {
        self.snapshot
            .objects
            .iter()
            .map(|entry| &entry.object)
            .filter(move |object| object.kind == kind)
    }
}

impl Catalog for SnapshotCatalog {
    fn database_name(&self) -> &str {
        &self.snapshot.database
    }

    fn prefetch_system_flags(&self, classes: &[CatalogClass]) -> Result<()> {
        // Flags are part of the document; there is nothing to fetch.
        tracing::trace!(classes = classes.len(), "system flags already materialized");
        Ok(())
    }

    fn schemas(&self) -> Result<Vec<SchemaInfo>> {
        Ok(self.snapshot.schemas.clone())
    }

    fn objects(&self, collection: Collection) -> Result<Vec<DatabaseObject>> {
        Ok(self.of_kind(collection.kind()).cloned().collect())
    }

    fn triggers(&self, parent: &DatabaseObject) -> Result<Vec<DatabaseObject>> {
        let Some(parent) = parent.to_ref() else {
            return Ok(Vec::new());
        };
        Ok(self
            .of_kind(ObjectKind::Trigger)
            .filter(|trigger| trigger.parent.as_ref() == Some(&parent))
            .cloned()
            .collect())
    }
}

/// Session factory for [`SnapshotSession`]s.
#[derive(Debug, Clone)]
pub struct SnapshotScripter {
    snapshot: Arc<CatalogSnapshot>,
}

impl SessionFactory for SnapshotScripter {
    type Session = SnapshotSession;

    fn connect(&self, worker: usize) -> Result<SnapshotSession> {
        tracing::debug!(worker, database = %self.snapshot.database, "opened scripting session");
        Ok(SnapshotSession::new(Arc::clone(&self.snapshot)))
    }
}

/// A scripting session bound to the thread that opened it.
pub struct SnapshotSession {
    snapshot: Arc<CatalogSnapshot>,
    /// `(kind, qualified name)` to object position
    index: HashMap<(ObjectKind, String), usize>,
    scripted: usize,
    _thread_bound: PhantomData<Rc<()>>,
}

impl SnapshotSession {
    fn new(snapshot: Arc<CatalogSnapshot>) -> Self {
        let index = snapshot
            .objects
            .iter()
            .enumerate()
            .map(|(i, entry)| ((entry.object.kind, entry.object.qualified_name()), i))
            .collect();
        Self {
            snapshot,
            index,
            scripted: 0,
            _thread_bound: PhantomData,
        }
    }

    /// Number of objects scripted by this session.
    pub fn scripted(&self) -> usize {
        self.scripted
    }

    /// Render the DDL of an object.
    pub fn render(&self, object: &DatabaseObject, options: &ScriptingOptions) -> Result<String> {
        let qualified = object.qualified_name();
        let entry = self
            .index
            .get(&(object.kind, qualified.clone()))
            .map(|&i| &self.snapshot.objects[i])
            .ok_or_else(|| Error::scripting(format!("{qualified} does not exist in {}", self.snapshot.database)))?;

        let mut script = String::new();
        if options.include_database_context {
            batch(&mut script, &format!("USE [{}]", self.snapshot.database));
        }
        let _ = writeln!(script, "/****** Object:  {} {} ******/", header_kind(object.kind), qualified);

        if object.kind.supports_alter() {
            batch(&mut script, "SET ANSI_NULLS ON");
            batch(&mut script, "SET QUOTED_IDENTIFIER ON");
        }

        match entry.definition.as_deref() {
            Some(definition) => batch(&mut script, definition),
            None if options.continue_on_error => {
                tracing::warn!(object = %object, "no definition available, writing placeholder");
                let _ = writeln!(script, "-- Definition of {qualified} could not be scripted");
            }
            None => {
                return Err(Error::scripting(format!("no definition available for {qualified}")));
            }
        }

        if object.kind == ObjectKind::Table {
            if options.include_dri {
                for constraint in &entry.constraints {
                    batch(&mut script, constraint);
                }
            }
            if options.include_indexes {
                for index in &entry.indexes {
                    batch(&mut script, index);
                }
            }
        }

        Ok(script)
    }
}

impl ScriptingSession for SnapshotSession {
    fn script(&mut self, job: &ScriptJob) -> Result<()> {
        let script = self.render(&job.object, &job.options)?;
        if !job.options.to_file_only {
            tracing::trace!(object = %job.object, script = %script, "scripted");
        }
        match job.options.encoding {
            ScriptEncoding::Utf8 => io::write_text(&job.target_path, &script)?,
            ScriptEncoding::Utf8Bom => io::write_text_with_bom(&job.target_path, &script)?,
        }
        self.scripted += 1;
        Ok(())
    }
}

/// Append one statement followed by a batch separator.
fn batch(script: &mut String, statement: &str) {
    script.push_str(statement.trim_end());
    script.push('\n');
    script.push_str(GO);
    script.push('\n');
}

fn header_kind(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Procedure => "StoredProcedure",
        ObjectKind::Function => "UserDefinedFunction",
        ObjectKind::View => "View",
        ObjectKind::Table => "Table",
        ObjectKind::Trigger => "Trigger",
    }
}
