//! Staged writes, inserts and deletes for one transaction attempt.

use std::collections::{HashMap, HashSet};

use rowctl_datum::Datum;
use uuid::Uuid;

use crate::row::Row;

#[derive(Debug, Clone)]
pub(crate) struct PendingInsert {
    pub table: String,
    pub columns: HashMap<String, Datum>,
}

/// One attempt at a transaction. Discarded and replaced wholesale on
/// `try_again` (spec.md §5: "the whole command stream ... is discarded and
/// rerun from scratch").
#[derive(Debug, Default)]
pub struct Transaction {
    pub(crate) writes: HashMap<(Uuid, String), Datum>,
    pub(crate) verified: HashMap<Uuid, u64>,
    pub(crate) inserts: HashMap<Uuid, PendingInsert>,
    pub(crate) deletes: HashSet<Uuid>,
    /// Provisional -> committed UUID, filled in by `Idl::commit` on
    /// success (spec.md §6 `txn_get_insert_uuid`).
    pub(crate) remap: HashMap<Uuid, Uuid>,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn is_pending_insert(&self, row: &Row) -> bool {
        self.inserts.contains_key(&row.uuid)
    }

    pub fn is_deleted(&self, row: &Row) -> bool {
        self.deletes.contains(&row.uuid)
    }
}
