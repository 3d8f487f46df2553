//! Database object model
//!
//! Read-only snapshot types describing the exportable objects of one
//! database. Values are fetched once per run and never mutated.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Schema that is always exported, even though it is flagged as a system schema.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Kind of an exportable schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Procedure,
    Function,
    View,
    Table,
    Trigger,
}

impl ObjectKind {
    /// All exportable kinds.
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Procedure,
        ObjectKind::Function,
        ObjectKind::View,
        ObjectKind::Table,
        ObjectKind::Trigger,
    ];

    /// Whether generated scripts of this kind are rewritten to `ALTER` form.
    ///
    /// Tables are kept as `CREATE TABLE` scripts.
    pub fn supports_alter(self) -> bool {
        !matches!(self, ObjectKind::Table)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Procedure => "procedure",
            ObjectKind::Function => "function",
            ObjectKind::View => "view",
            ObjectKind::Table => "table",
            ObjectKind::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "procedure" | "proc" => Ok(ObjectKind::Procedure),
            "function" => Ok(ObjectKind::Function),
            "view" => Ok(ObjectKind::View),
            "table" => Ok(ObjectKind::Table),
            "trigger" => Ok(ObjectKind::Trigger),
            other => Err(format!("unknown object kind: {other}")),
        }
    }
}

/// Reference to a schema-scoped object, used for trigger parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub schema: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            schema: schema.into(),
            name: name.into(),
        }
    }
}

/// One exportable schema object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseObject {
    pub kind: ObjectKind,
    /// Owning schema; triggers take theirs from [`DatabaseObject::parent`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    /// Owning table or view of a trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectRef>,
    #[serde(default)]
    pub is_system: bool,
}

impl DatabaseObject {
    /// A schema-scoped, non-system object.
    pub fn new(kind: ObjectKind, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            schema: Some(schema.into()),
            name: name.into(),
            parent: None,
            is_system: false,
        }
    }

    /// A non-system trigger owned by `parent`.
    pub fn trigger(name: impl Into<String>, parent: ObjectRef) -> Self {
        Self {
            kind: ObjectKind::Trigger,
            schema: None,
            name: name.into(),
            parent: Some(parent),
            is_system: false,
        }
    }

    pub fn with_system(mut self, is_system: bool) -> Self {
        self.is_system = is_system;
        self
    }

    /// Reference to this object, for use as a trigger parent.
    pub fn to_ref(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(self.kind, self.schema.clone()?, self.name.clone()))
    }

    /// Schema the object is filed under.
    ///
    /// Triggers resolve their schema from the owning table or view.
    pub fn owning_schema(&self) -> Result<&str> {
        let schema = match self.kind {
            ObjectKind::Trigger => self.parent.as_ref().map(|p| p.schema.as_str()),
            _ => self.schema.as_deref(),
        };
        schema.filter(|s| !s.is_empty()).ok_or(Error::MissingSchema)
    }

    /// Bracket-quoted name, e.g. `[sales].[Orders].[trg_audit]`.
    pub fn qualified_name(&self) -> String {
        match (&self.kind, &self.parent, &self.schema) {
            (ObjectKind::Trigger, Some(parent), _) => {
                format!("[{}].[{}].[{}]", parent.schema, parent.name, self.name)
            }
            (_, _, Some(schema)) => format!("[{}].[{}]", schema, self.name),
            _ => format!("[{}]", self.name),
        }
    }
}

impl std::fmt::Display for DatabaseObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.qualified_name())
    }
}

/// A database schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    #[serde(default)]
    pub is_system: bool,
}

impl SchemaInfo {
    pub fn new(name: impl Into<String>, is_system: bool) -> Self {
        Self {
            name: name.into(),
            is_system,
        }
    }

    /// Whether the schema gets a directory skeleton in the project.
    pub fn is_exportable(&self) -> bool {
        !self.is_system || self.name == DEFAULT_SCHEMA
    }
}
