//! Row resolution: a user-typed token to a unique row, by UUID or by a
//! schema-declared row-id path (spec.md §4.C).

use rowctl_datum::Atom;
use rowctl_idl::{Idl, Row, Transaction};
use uuid::Uuid;

use crate::error::CtlError;
use crate::schema::CtlTableClass;

/// `get_row(table, record_id, must_exist)` per spec.md §4.C. `Ok(None)`
/// only ever occurs when `must_exist` is false and nothing matched.
pub fn get_row(
    idl: &Idl,
    txn: &Transaction,
    table: &CtlTableClass,
    record_id: &str,
    must_exist: bool,
) -> Result<Option<Row>, CtlError> {
    if let Ok(uuid) = Uuid::parse_str(record_id) {
        if let Some(row) = idl.get_row_for_uuid(txn, table.name(), uuid) {
            return Ok(Some(row));
        }
    }

    for descriptor in &table.row_ids {
        if let Some(row) = get_row_by_id(idl, txn, table, descriptor, record_id)? {
            return Ok(Some(row));
        }
    }

    if must_exist {
        return Err(CtlError::resolution(format!(
            "no row \"{record_id}\" in table {}",
            table.name()
        )));
    }
    Ok(None)
}

fn get_row_by_id(
    idl: &Idl,
    txn: &Transaction,
    table: &CtlTableClass,
    descriptor: &crate::schema::RowIdDescriptor,
    record_id: &str,
) -> Result<Option<Row>, CtlError> {
    let Some(name_column) = &descriptor.name_column else {
        if record_id != "." {
            return Ok(None);
        }
        let mut rows = idl.rows(txn, &descriptor.table);
        let first = rows.next();
        return match (first, rows.next()) {
            (Some(row), None) => resolve_referrer(idl, txn, table, descriptor, row),
            _ => Ok(None),
        };
    };

    let mut matches = idl.rows(txn, &descriptor.table).filter(|row| {
        idl.read(txn, row, name_column)
            .ok()
            .and_then(|d| d.as_scalar_string())
            .as_deref()
            == Some(record_id)
    });

    let Some(referrer) = matches.next() else {
        return Ok(None);
    };
    if matches.next().is_some() {
        return Err(CtlError::resolution(format!(
            "multiple rows in {} match \"{record_id}\"",
            descriptor.table
        )));
    }

    resolve_referrer(idl, txn, table, descriptor, referrer)
}

/// If `descriptor.uuid_column` is set, the referrer names the target row
/// indirectly; otherwise the referrer *is* the target.
fn resolve_referrer(
    idl: &Idl,
    txn: &Transaction,
    table: &CtlTableClass,
    descriptor: &crate::schema::RowIdDescriptor,
    referrer: Row,
) -> Result<Option<Row>, CtlError> {
    let Some(uuid_column) = &descriptor.uuid_column else {
        return Ok(Some(referrer));
    };
    let uuid_datum = idl.read(txn, &referrer, uuid_column)?;
    let Some(uuid) = uuid_datum.as_scalar_uuid() else {
        return Ok(None);
    };
    Ok(idl.get_row_for_uuid(txn, table.name(), uuid))
}

trait ScalarExtract {
    fn as_scalar_string(&self) -> Option<String>;
    fn as_scalar_uuid(&self) -> Option<Uuid>;
}

impl ScalarExtract for rowctl_datum::Datum {
    fn as_scalar_string(&self) -> Option<String> {
        if self.is_empty() || self.is_map() || self.len() != 1 {
            return None;
        }
        self.keys()[0].as_str().map(str::to_string)
    }

    fn as_scalar_uuid(&self) -> Option<Uuid> {
        if self.is_empty() || self.is_map() || self.len() != 1 {
            return None;
        }
        self.keys()[0].as_uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowctl_datum::{AtomicType, ColumnType, Datum};
    use rowctl_idl::{Column, TableClass};

    use crate::schema::RowIdDescriptor;

    fn port_schema() -> (Idl, CtlTableClass) {
        let mut idl = Idl::new();
        let tc = TableClass::new(
            "Port",
            vec![
                Column::new("name", ColumnType::scalar(AtomicType::String)),
                Column::new("tag", ColumnType::optional_scalar(AtomicType::Integer)),
            ],
            false,
        );
        idl.add_table(tc.clone());
        idl.declare_column("Port", "name").unwrap();
        idl.declare_column("Port", "tag").unwrap();
        let ctl = CtlTableClass::new(tc, vec![RowIdDescriptor::named("Port", "name")]);
        (idl, ctl)
    }

    #[test]
    fn resolves_by_uuid() {
        let (mut idl, ctl) = port_schema();
        let mut txn = idl.open_txn();
        let row = idl.txn_insert(&mut txn, "Port", None).unwrap();
        idl.txn_write(&mut txn, &row, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        idl.commit(&mut txn).unwrap();
        let committed = idl.txn_get_insert_uuid(&txn, row.uuid).unwrap();

        let txn2 = idl.open_txn();
        let found = get_row(&idl, &txn2, &ctl, &committed.to_string(), true).unwrap();
        assert_eq!(found.unwrap().uuid, committed);
    }

    #[test]
    fn resolves_by_name_column() {
        let (mut idl, ctl) = port_schema();
        let mut txn = idl.open_txn();
        let row = idl.txn_insert(&mut txn, "Port", None).unwrap();
        idl.txn_write(&mut txn, &row, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        idl.commit(&mut txn).unwrap();

        let txn2 = idl.open_txn();
        let found = get_row(&idl, &txn2, &ctl, "eth0", true).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn ambiguous_name_is_fatal() {
        let (mut idl, ctl) = port_schema();
        let mut txn = idl.open_txn();
        let a = idl.txn_insert(&mut txn, "Port", None).unwrap();
        idl.txn_write(&mut txn, &a, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        let b = idl.txn_insert(&mut txn, "Port", None).unwrap();
        idl.txn_write(&mut txn, &b, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        idl.commit(&mut txn).unwrap();

        let txn2 = idl.open_txn();
        let err = get_row(&idl, &txn2, &ctl, "eth0", true).unwrap_err();
        assert!(matches!(err, CtlError::Resolution(_)));
    }

    #[test]
    fn missing_row_without_must_exist_returns_none() {
        let (idl, ctl) = port_schema();
        let txn = idl.open_txn();
        let found = get_row(&idl, &txn, &ctl, "nope", false).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn missing_row_with_must_exist_is_fatal() {
        let (idl, ctl) = port_schema();
        let txn = idl.open_txn();
        let err = get_row(&idl, &txn, &ctl, "nope", true).unwrap_err();
        assert!(matches!(err, CtlError::Resolution(_)));
    }
}
