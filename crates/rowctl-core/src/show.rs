//! Component H: the generic `show` renderer, walking a user-declared
//! table-graph through strong UUID references and weak back-references,
//! breaking cycles path-locally (spec.md §4.H).

use std::collections::HashSet;

use rowctl_datum::{AtomicType, Datum};
use rowctl_idl::{Idl, Row, Transaction};

use crate::error::CtlError;
use crate::schema::CmdShowTable;

/// Render every row of `cmd_show_tables[0]`'s table (the `show` root),
/// recursing through strong/weak references per spec.md §4.H.
pub fn render_show(
    idl: &Idl,
    txn: &Transaction,
    cmd_show_tables: &[CmdShowTable],
) -> Result<String, CtlError> {
    let root = cmd_show_tables
        .first()
        .ok_or_else(|| CtlError::usage("show: no cmd_show_tables registered"))?;
    let mut out = String::new();
    for row in idl.rows(txn, &root.table).collect::<Vec<_>>() {
        let mut shown = HashSet::new();
        render_row(idl, txn, cmd_show_tables, &row, 0, &mut shown, &mut out)?;
    }
    Ok(out)
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level * 4 {
        out.push(' ');
    }
}

fn render_row(
    idl: &Idl,
    txn: &Transaction,
    tables: &[CmdShowTable],
    row: &Row,
    level: usize,
    shown: &mut HashSet<String>,
    out: &mut String,
) -> Result<(), CtlError> {
    let desc = tables.iter().find(|t| t.table == row.table());

    indent(out, level);
    match desc.and_then(|d| d.name_column.as_ref()) {
        Some(name_col) => {
            let name = idl.read(txn, row, name_col)?;
            out.push_str(row.table());
            out.push_str(" \"");
            out.push_str(&format_datum(&name));
            out.push_str("\"\n");
        }
        None => {
            out.push_str(row.table());
            out.push(' ');
            out.push_str(&row.uuid.to_string());
            out.push('\n');
        }
    }

    let Some(desc) = desc else {
        return Ok(());
    };
    if shown.contains(&desc.table) {
        return Ok(());
    }
    shown.insert(desc.table.clone());

    let tc = idl.table_class(row.table());
    for col in &desc.columns {
        let datum = idl.read(txn, row, col)?;
        let coldef = tc.and_then(|tc| tc.column(col));

        if let Some(coldef) = coldef {
            if coldef.ty.key_type == AtomicType::Uuid && !coldef.ty.is_map() {
                if let Some(target_table) = &coldef.ty.key_ref_target {
                    if tables.iter().any(|t| &t.table == target_table) {
                        for key in datum.keys() {
                            if let Some(uuid) = key.as_uuid() {
                                if let Some(target_row) =
                                    idl.get_row_for_uuid(txn, target_table, uuid)
                                {
                                    render_row(idl, txn, tables, &target_row, level + 1, shown, out)?;
                                }
                            }
                        }
                        continue;
                    }
                }
            }
            if coldef.ty.is_map() {
                if let Some(value_ref) = &coldef.ty.value_ref_target {
                    if let Some(target_desc) =
                        tables.iter().find(|t| &t.table == value_ref && t.name_column.is_some())
                    {
                        indent(out, level + 1);
                        out.push_str(col);
                        out.push_str(":\n");
                        if let Some(values) = datum.values() {
                            for (k, v) in datum.keys().iter().zip(values) {
                                let ref_name = v
                                    .as_uuid()
                                    .and_then(|u| idl.get_row_for_uuid(txn, value_ref, u))
                                    .and_then(|r| {
                                        idl.read(txn, &r, target_desc.name_column.as_ref().unwrap())
                                            .ok()
                                    })
                                    .map(|d| format_datum(&d));
                                indent(out, level + 2);
                                out.push_str(&format!(
                                    "{k}=\"{}\"\n",
                                    ref_name.unwrap_or_else(|| "<null>".to_string())
                                ));
                            }
                        }
                        continue;
                    }
                }
            }
        }

        if !datum.is_default() {
            indent(out, level + 1);
            out.push_str(&format!("{col}: {}\n", format_datum(&datum)));
        }
    }

    if let Some(wref) = &desc.wref_table {
        for wrow in idl.rows(txn, &wref.table).collect::<Vec<_>>() {
            let wdatum = idl.read(txn, &wrow, &wref.wref_column)?;
            if wdatum.keys().first().and_then(|a| a.as_uuid()) == Some(row.uuid) {
                render_row(idl, txn, tables, &wrow, level + 1, shown, out)?;
            }
        }
    }

    shown.remove(&desc.table);
    Ok(())
}

/// Pretty-print a datum the way `get`/`list`/`find`/`show` all render a
/// cell: a bare scalar, a `[a, b]` set, or a `{k=v, ...}` map.
pub fn format_datum(d: &Datum) -> String {
    match d.values() {
        None => {
            if d.is_empty() {
                String::new()
            } else if d.len() == 1 {
                d.keys()[0].to_string()
            } else {
                let inner = d.keys().iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                format!("[{inner}]")
            }
        }
        Some(values) => {
            let inner = d
                .keys()
                .iter()
                .zip(values)
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{inner}}}")
        }
    }
}

/// A minimal aligned grid renderer for `list`/`find` (spec.md §4.F).
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let mut out = String::new();
    push_row(&mut out, headers, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let width = widths.get(i).copied().unwrap_or(c.chars().count());
            format!("{c:<width$}")
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}
