use serde::{Deserialize, Serialize};

/// Summary of a successful sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Schemas that received a directory skeleton
    pub schemas: usize,
    /// Folders newly registered in the project
    pub folders_added: usize,
    /// Exportable objects found in the database
    pub objects: usize,
    /// Objects scripted successfully
    pub exported: usize,
    /// Scripts newly registered in the project
    pub items_added: usize,
    /// Scripts whose content differs from the previous file
    pub files_changed: usize,
    /// Scripts rewritten with identical content
    pub files_unchanged: usize,
}

impl SyncReport {
    /// Whether the run left the project exactly as it found it.
    pub fn is_noop(&self) -> bool {
        self.folders_added == 0 && self.items_added == 0 && self.files_changed == 0
    }
}
