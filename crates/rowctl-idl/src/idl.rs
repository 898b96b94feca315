//! The IDL: a caching, transactional client over a row store.
//!
//! Grounded on `oxidized_state::handle::SurrealHandle` (one owning handle
//! mediating all reads/writes) and `oxidized_state::fakes` (an in-memory
//! backend standing in for a real server — here there is no real server at
//! all: this *is* the cache, playing both roles the spec's data-flow
//! diagram assigns to "IDL cache" and "database server").
//!
//! `first_row`/`next_row` from spec.md §6 are collapsed into a single
//! Rust iterator (`Idl::rows`); this is a deliberate idiomatic departure,
//! noted in DESIGN.md, not a semantic change.

use std::collections::{HashMap, HashSet};

use rowctl_datum::Datum;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{CommitOutcome, IdlError};
use crate::row::Row;
use crate::schema::TableClass;
use crate::txn::{PendingInsert, Transaction};

#[derive(Debug, Clone)]
struct RowRecord {
    table: String,
    columns: HashMap<String, Datum>,
    revision: u64,
}

/// The caching, transactional client the interpreter core is built
/// against. Owns the full schema catalog and the committed row store.
#[derive(Debug, Default)]
pub struct Idl {
    tables: HashMap<String, TableClass>,
    declared: HashMap<String, HashSet<String>>,
    rows: HashMap<Uuid, RowRecord>,
}

impl Idl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table's full schema. Idempotent. Corresponds to
    /// `add_table` in spec.md §6.
    pub fn add_table(&mut self, tc: TableClass) {
        self.declared.entry(tc.name.clone()).or_default();
        self.tables.insert(tc.name.clone(), tc);
    }

    /// Declare that a pre-pass will need `column` of `table` cached.
    /// Corresponds to `add_column` in spec.md §6. Fails if `add_table` was
    /// never called for `table`, or `column` does not exist on it.
    pub fn declare_column(&mut self, table: &str, column: &str) -> Result<(), IdlError> {
        let tc = self
            .tables
            .get(table)
            .ok_or_else(|| IdlError::UndeclaredTable(table.to_string()))?;
        if tc.column(column).is_none() {
            return Err(IdlError::UndeclaredColumn(
                column.to_string(),
                table.to_string(),
            ));
        }
        self.declared
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string());
        Ok(())
    }

    pub fn table_class(&self, name: &str) -> Option<&TableClass> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableClass> {
        self.tables.values()
    }

    pub fn open_txn(&self) -> Transaction {
        Transaction::new()
    }

    fn check_declared(&self, table: &str, column: &str) -> Result<(), IdlError> {
        match self.declared.get(table) {
            Some(cols) if cols.contains(column) => Ok(()),
            _ => Err(IdlError::UndeclaredColumn(
                column.to_string(),
                table.to_string(),
            )),
        }
    }

    /// Live rows of `table`, reflecting this transaction's staged inserts
    /// and deletes.
    pub fn rows<'a>(&'a self, txn: &'a Transaction, table: &'a str) -> impl Iterator<Item = Row> + 'a {
        let committed = self
            .rows
            .iter()
            .filter(move |(uuid, r)| r.table == table && !txn.deletes.contains(uuid))
            .map(|(uuid, r)| Row::new(*uuid, r.table.clone()));
        let pending = txn
            .inserts
            .iter()
            .filter(move |(_, ins)| ins.table == table)
            .map(|(uuid, ins)| Row::new(*uuid, ins.table.clone()));
        committed.chain(pending)
    }

    pub fn get_row_for_uuid(&self, txn: &Transaction, table: &str, uuid: Uuid) -> Option<Row> {
        if txn.deletes.contains(&uuid) {
            return None;
        }
        if let Some(ins) = txn.inserts.get(&uuid) {
            if ins.table == table {
                return Some(Row::new(uuid, table));
            }
        }
        self.rows
            .get(&uuid)
            .filter(|r| r.table == table)
            .map(|_| Row::new(uuid, table))
    }

    /// Current in-transaction value, overlaying any staged write
    /// (spec.md §6 `read`: "current in-transaction datum").
    pub fn read(&self, txn: &Transaction, row: &Row, col: &str) -> Result<Datum, IdlError> {
        self.check_declared(row.table(), col)?;
        if let Some(d) = txn.writes.get(&(row.uuid, col.to_string())) {
            return Ok(d.clone());
        }
        if let Some(ins) = txn.inserts.get(&row.uuid) {
            return Ok(ins.columns.get(col).cloned().unwrap_or_default());
        }
        Ok(self
            .rows
            .get(&row.uuid)
            .and_then(|r| r.columns.get(col))
            .cloned()
            .unwrap_or_default())
    }

    pub fn is_mutable(&self, table: &str, col: &str) -> Result<bool, IdlError> {
        let tc = self
            .tables
            .get(table)
            .ok_or_else(|| IdlError::UndeclaredTable(table.to_string()))?;
        let column = tc
            .column(col)
            .ok_or_else(|| IdlError::UndeclaredColumn(col.to_string(), table.to_string()))?;
        Ok(column.mutable)
    }

    /// Mark `col` of `row` as participating in optimistic concurrency for
    /// this attempt (spec.md §6 `txn_verify`).
    pub fn txn_verify(&self, txn: &mut Transaction, row: &Row, _col: &str) {
        let revision = self.rows.get(&row.uuid).map(|r| r.revision).unwrap_or(0);
        txn.verified.insert(row.uuid, revision);
    }

    pub fn txn_write(
        &self,
        txn: &mut Transaction,
        row: &Row,
        col: &str,
        datum: Datum,
    ) -> Result<(), IdlError> {
        if !self.is_mutable(row.table(), col)? {
            return Err(IdlError::ReadOnlyColumn(col.to_string()));
        }
        if let Some(ins) = txn.inserts.get_mut(&row.uuid) {
            ins.columns.insert(col.to_string(), datum);
        } else {
            txn.writes.insert((row.uuid, col.to_string()), datum);
        }
        Ok(())
    }

    /// Stage a provisional row insert, returning a [`Row`] whose UUID is
    /// provisional until commit (spec.md invariant 2).
    pub fn txn_insert(
        &self,
        txn: &mut Transaction,
        table: &str,
        uuid: Option<Uuid>,
    ) -> Result<Row, IdlError> {
        if !self.tables.contains_key(table) {
            return Err(IdlError::UndeclaredTable(table.to_string()));
        }
        let provisional = uuid.unwrap_or_else(Uuid::new_v4);
        txn.inserts.insert(
            provisional,
            PendingInsert {
                table: table.to_string(),
                columns: HashMap::new(),
            },
        );
        Ok(Row::new(provisional, table))
    }

    pub fn txn_delete(&self, txn: &mut Transaction, row: &Row) {
        if txn.inserts.remove(&row.uuid).is_none() {
            txn.deletes.insert(row.uuid);
        }
    }

    /// After a successful commit, map a provisional insert UUID to its
    /// committed UUID (spec.md §6 `txn_get_insert_uuid`).
    pub fn txn_get_insert_uuid(&self, txn: &Transaction, provisional: Uuid) -> Option<Uuid> {
        txn.remap.get(&provisional).copied()
    }

    /// Commit a transaction attempt: verify optimistic-concurrency
    /// invariants, remap provisional insert UUIDs to freshly committed
    /// ones (rewriting every reference to them in the same attempt, per
    /// spec.md §5 — "the IDL performs that remapping during commit"),
    /// apply deletes, and fold staged writes into the committed store.
    #[instrument(skip_all)]
    pub fn commit(&mut self, txn: &mut Transaction) -> Result<CommitOutcome, IdlError> {
        for (&uuid, &seen_revision) in &txn.verified {
            let current = self.rows.get(&uuid).map(|r| r.revision).unwrap_or(0);
            if current != seen_revision {
                debug!(%uuid, "optimistic concurrency conflict, retrying");
                return Ok(CommitOutcome::TryAgainRetry);
            }
        }

        let remap: HashMap<Uuid, Uuid> = txn
            .inserts
            .keys()
            .map(|provisional| (*provisional, Uuid::new_v4()))
            .collect();

        let remap_datum = |d: &Datum| -> Datum {
            if remap.is_empty() {
                return d.clone();
            }
            rewrite_uuid_refs(d, &remap)
        };

        for uuid in &txn.deletes {
            self.rows.remove(uuid);
        }

        for ((row_uuid, col), col_datum) in &txn.writes {
            if txn.deletes.contains(row_uuid) {
                continue;
            }
            let datum = remap_datum(col_datum);
            if let Some(record) = self.rows.get_mut(row_uuid) {
                record.columns.insert(col.clone(), datum);
                record.revision += 1;
            } else {
                warn!(%row_uuid, "write staged against a row missing at commit time");
            }
        }

        for (provisional, pending) in txn.inserts.drain() {
            let committed_uuid = remap[&provisional];
            let columns = pending
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), remap_datum(v)))
                .collect();
            self.rows.insert(
                committed_uuid,
                RowRecord {
                    table: pending.table,
                    columns,
                    revision: 0,
                },
            );
        }

        txn.remap = remap;
        Ok(CommitOutcome::Success)
    }
}

fn rewrite_uuid_refs(d: &Datum, remap: &HashMap<Uuid, Uuid>) -> Datum {
    use rowctl_datum::Atom;
    let rewrite_atom = |a: &Atom| -> Atom {
        match a.as_uuid() {
            Some(u) if remap.contains_key(&u) => Atom::Uuid(remap[&u]),
            _ => a.clone(),
        }
    };
    let keys: Vec<Atom> = d.keys().iter().map(rewrite_atom).collect();
    match d.values() {
        None => Datum::set(keys),
        Some(values) => {
            let values: Vec<Atom> = values.iter().map(rewrite_atom).collect();
            Datum::map(keys.into_iter().zip(values).collect())
                .expect("rewriting values cannot introduce duplicate keys")
        }
    }
}
