//! Database catalog access and object enumeration
//!
//! A [`Catalog`] is the live database handle. [`enumerate_objects`] turns it
//! into the set of objects to export: every non-system procedure, function,
//! view and table, plus the non-system triggers owned by tables and views.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::model::{DatabaseObject, ObjectKind, SchemaInfo};

/// A top-level object collection of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Procedures,
    Functions,
    Views,
    Tables,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Procedures,
        Collection::Functions,
        Collection::Views,
        Collection::Tables,
    ];

    /// Kind of the objects in this collection.
    pub fn kind(self) -> ObjectKind {
        match self {
            Collection::Procedures => ObjectKind::Procedure,
            Collection::Functions => ObjectKind::Function,
            Collection::Views => ObjectKind::View,
            Collection::Tables => ObjectKind::Table,
        }
    }
}

/// Object classes whose "is system object" flag can be prefetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogClass {
    Object(ObjectKind),
    Schema,
}

/// Classes prefetched before enumeration.
pub fn prefetch_classes() -> Vec<CatalogClass> {
    ObjectKind::ALL
        .into_iter()
        .map(CatalogClass::Object)
        .chain(std::iter::once(CatalogClass::Schema))
        .collect()
}

/// A live database handle.
///
/// Errors caused by a lost or unavailable connection must be reported as
/// [`crate::Error::Connection`]; they abort the run.
pub trait Catalog {
    /// Name of the database.
    fn database_name(&self) -> &str;

    /// Load the "is system object" flag for whole classes at once, so
    /// filtering does not cost one round trip per object.
    fn prefetch_system_flags(&self, classes: &[CatalogClass]) -> Result<()>;

    /// All schemas, system ones included.
    fn schemas(&self) -> Result<Vec<SchemaInfo>>;

    /// All objects of a top-level collection, system ones included.
    fn objects(&self, collection: Collection) -> Result<Vec<DatabaseObject>>;

    /// Triggers owned by a table or view, system ones included.
    fn triggers(&self, parent: &DatabaseObject) -> Result<Vec<DatabaseObject>>;
}

/// Enumerate every exportable object.
///
/// Order follows the collections and is not meaningful to callers.
pub fn enumerate_objects<C: Catalog + ?Sized>(catalog: &C) -> Result<Vec<DatabaseObject>> {
    catalog.prefetch_system_flags(&prefetch_classes())?;

    let mut all = Vec::new();
    let mut trigger_parents = Vec::new();
    for collection in Collection::ALL {
        let objects = catalog.objects(collection)?;
        if matches!(collection, Collection::Tables | Collection::Views) {
            trigger_parents.extend(objects.iter().cloned());
        }
        all.extend(objects);
    }

    for parent in &trigger_parents {
        all.extend(catalog.triggers(parent)?);
    }

    let total = all.len();
    all.retain(|object| !object.is_system);
    tracing::info!(
        database = catalog.database_name(),
        exportable = all.len(),
        skipped_system = total - all.len(),
        "enumerated database objects"
    );
    Ok(all)
}

/// Schemas that get a directory skeleton: non-system ones and `dbo`.
pub fn exportable_schemas<C: Catalog + ?Sized>(catalog: &C) -> Result<Vec<SchemaInfo>> {
    Ok(catalog
        .schemas()?
        .into_iter()
        .filter(SchemaInfo::is_exportable)
        .collect())
}
