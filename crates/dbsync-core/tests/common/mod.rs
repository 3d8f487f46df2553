//! In-memory collaborators for engine tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};

use dbsync_core::{
    Catalog, CatalogClass, Collection, DatabaseObject, Error, ItemKind, ObjectKind, ObjectRef, ProjectManifest,
    Result, SchemaInfo, ScriptJob, ScriptingSession, SessionFactory,
};
use dbsync_fs::{NormalizedPath, io};

/// Catalog over a fixed object list.
#[derive(Default)]
pub struct FakeCatalog {
    pub objects: Vec<DatabaseObject>,
    pub schemas: Vec<SchemaInfo>,
    pub offline: bool,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            schemas: vec![
                SchemaInfo::new("dbo", true),
                SchemaInfo::new("sys", true),
                SchemaInfo::new("sales", false),
            ],
            ..Default::default()
        }
    }

    pub fn with(mut self, object: DatabaseObject) -> Self {
        self.objects.push(object);
        self
    }

    /// `sales.GetOrders`, system `sys.sp_internal`, table `sales.Orders`
    /// with trigger `trg_audit`, view `dbo.OpenOrders` and function
    /// `dbo.fn_total`.
    pub fn sales() -> Self {
        Self::new()
            .with(DatabaseObject::new(ObjectKind::Procedure, "sales", "GetOrders"))
            .with(DatabaseObject::new(ObjectKind::Procedure, "sys", "sp_internal").with_system(true))
            .with(DatabaseObject::new(ObjectKind::Table, "sales", "Orders"))
            .with(DatabaseObject::trigger("trg_audit", orders_table()))
            .with(DatabaseObject::new(ObjectKind::View, "dbo", "OpenOrders"))
            .with(DatabaseObject::new(ObjectKind::Function, "dbo", "fn_total"))
    }
}

pub fn orders_table() -> ObjectRef {
    ObjectRef::new(ObjectKind::Table, "sales", "Orders")
}

impl Catalog for FakeCatalog {
    fn database_name(&self) -> &str {
        "Sales"
    }

    fn prefetch_system_flags(&self, _classes: &[CatalogClass]) -> Result<()> {
        Ok(())
    }

    fn schemas(&self) -> Result<Vec<SchemaInfo>> {
        Ok(self.schemas.clone())
    }

    fn objects(&self, collection: Collection) -> Result<Vec<DatabaseObject>> {
        if self.offline {
            return Err(Error::connection("Sales", "server unreachable"));
        }
        Ok(self
            .objects
            .iter()
            .filter(|o| o.kind == collection.kind())
            .cloned()
            .collect())
    }

    fn triggers(&self, parent: &DatabaseObject) -> Result<Vec<DatabaseObject>> {
        let parent = parent.to_ref();
        Ok(self
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Trigger && o.parent == parent)
            .cloned()
            .collect())
    }
}

/// Session factory writing a fixed `CREATE` script per object.
#[derive(Default)]
pub struct FakeScripter {
    /// Objects whose scripting fails
    pub failing: HashSet<String>,
    /// Objects whose scripting loses the connection
    pub disconnecting: HashSet<String>,
    pub refuse_connections: bool,
    /// Thread that opened each session
    pub sessions: Mutex<Vec<ThreadId>>,
    pub scripted: AtomicUsize,
}

impl FakeScripter {
    pub fn failing_on(name: &str) -> Self {
        Self {
            failing: HashSet::from([name.to_string()]),
            ..Default::default()
        }
    }

    pub fn disconnecting_on(name: &str) -> Self {
        Self {
            disconnecting: HashSet::from([name.to_string()]),
            ..Default::default()
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

/// Borrowed so tests can inspect the scripter after a run.
impl<'a> SessionFactory for &'a FakeScripter {
    type Session = FakeSession<'a>;

    fn connect(&self, _worker: usize) -> Result<FakeSession<'a>> {
        if self.refuse_connections {
            return Err(Error::connection("Sales", "login failed"));
        }
        let thread = thread::current().id();
        self.sessions.lock().unwrap().push(thread);
        Ok(FakeSession {
            scripter: *self,
            thread,
        })
    }
}

pub struct FakeSession<'a> {
    scripter: &'a FakeScripter,
    thread: ThreadId,
}

impl ScriptingSession for FakeSession<'_> {
    fn script(&mut self, job: &ScriptJob) -> Result<()> {
        assert_eq!(thread::current().id(), self.thread, "session used off its thread");

        let name = &job.object.name;
        if self.scripter.disconnecting.contains(name) {
            return Err(Error::connection("Sales", "connection reset"));
        }
        if self.scripter.failing.contains(name) {
            return Err(Error::scripting(format!("cannot script {name}")));
        }

        io::write_text(&job.target_path, &create_script(&job.object))?;
        self.scripter.scripted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Script the fake backend writes for an object.
pub fn create_script(object: &DatabaseObject) -> String {
    let keyword = match object.kind {
        ObjectKind::Procedure => "PROCEDURE",
        ObjectKind::Function => "FUNCTION",
        ObjectKind::View => "VIEW",
        ObjectKind::Table => "TABLE",
        ObjectKind::Trigger => "TRIGGER",
    };
    format!(
        "SET ANSI_NULLS ON\nGO\nCREATE {keyword} {} AS SELECT 1\nGO\n",
        object.qualified_name()
    )
}

/// Manifest kept in memory.
pub struct MemoryManifest {
    pub directory: PathBuf,
    pub items: Vec<(ItemKind, String)>,
    pub saved: Vec<(ItemKind, String)>,
    pub saves: usize,
    pub fail_save: bool,
}

impl MemoryManifest {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            items: Vec::new(),
            saved: Vec::new(),
            saves: 0,
            fail_save: false,
        }
    }

    pub fn count(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn contains(&self, path: &str) -> bool {
        let key = NormalizedPath::new(path).item_key();
        self.items.iter().any(|(_, p)| *p == key)
    }
}

impl ProjectManifest for MemoryManifest {
    fn directory(&self) -> &Path {
        &self.directory
    }

    fn has_path(&self, path: &NormalizedPath) -> bool {
        let key = path.item_key();
        self.items.iter().any(|(_, p)| *p == key)
    }

    fn add_item(&mut self, kind: ItemKind, path: &NormalizedPath) -> Result<()> {
        self.items.push((kind, path.item_key()));
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if self.fail_save {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.saves += 1;
        self.saved = self.items.clone();
        Ok(())
    }
}
