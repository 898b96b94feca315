//! Opaque row handles.

use uuid::Uuid;

/// A handle to one row. Cheap to clone; all actual data lives in the
/// [`crate::Idl`]/[`crate::Transaction`] pair it was obtained from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    pub uuid: Uuid,
    table: String,
}

impl Row {
    pub(crate) fn new(uuid: Uuid, table: impl Into<String>) -> Self {
        Row {
            uuid,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}
