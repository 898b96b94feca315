//! `set TABLE RECORD COL[:KEY]=VALUE...` (spec.md §4.F).

use crate::arg;
use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;

use super::support::{declare_resolution_columns, require_table, resolve_row, substitute_symbols};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_resolution_columns(ctx, &table)?;
    let assignments: Vec<String> = ctx.argv[2..].to_vec();
    for token in &assignments {
        let parsed = arg::parse_column_key_value(token, &table.class, &["="], true)?;
        ctx.idl.declare_column(table.name(), &parsed.column.name)?;
    }
    Ok(())
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, &ctx.argv[0])?;
    let record = ctx.argv[1].clone();
    let must_exist = !ctx.has_option("if-exists");

    let row = match resolve_row(ctx, &table, &record, must_exist)? {
        Some(row) => row,
        None => return Ok(()),
    };

    let assignments: Vec<String> = ctx.argv[2..].to_vec();
    for token in &assignments {
        let parsed = arg::parse_column_key_value(token, &table.class, &["="], true)?;
        let column_name = parsed.column.name.clone();
        let column_ty = parsed.column.ty.clone();

        if !ctx.idl.is_mutable(table.name(), &column_name)? {
            return Err(CtlError::semantic(format!(
                "{column_name} is a read-only column, cannot be set"
            )));
        }

        let raw_value = parsed.value.as_deref().unwrap_or("");
        let substituted = substitute_symbols(raw_value, ctx.symtab)?;

        ctx.idl.txn_verify(ctx.txn, &row, &column_name);

        let new_value = match &parsed.key {
            Some(key_text) => {
                let key_atom = rowctl_datum::Atom::parse(key_text, column_ty.key_type)?;
                if !column_ty.is_map() {
                    return Err(CtlError::type_error(format!(
                        "{column_name} is not a map column, cannot be set by key"
                    )));
                }
                let value_type = column_ty
                    .value_type
                    .expect("is_map implies value_type is Some");
                let value_atom = rowctl_datum::Atom::parse(&substituted, value_type)?;
                let overlay = rowctl_datum::Datum::map(vec![(key_atom, value_atom)])
                    .expect("single pair cannot collide with itself");
                let current = ctx.idl.read(ctx.txn, &row, &column_name)?;
                let merged = current.union(&overlay);
                merged.check_cardinality(&column_ty)?;
                merged
            }
            None => {
                let parsed_datum = rowctl_datum::Datum::parse(&substituted, &column_ty)?;
                parsed_datum.check_cardinality(&column_ty)?;
                parsed_datum
            }
        };

        ctx.idl.txn_write(ctx.txn, &row, &column_name, new_value)?;
    }
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "set",
        min_args: 2,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "set TABLE RECORD COLUMN[:KEY]=VALUE...",
        options_spec: "--if-exists",
        mode: Mode::Rw,
        pre,
        run,
        post: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowctl_datum::{Atom, AtomicType, ColumnType, Datum};
    use rowctl_idl::{Column, Idl, TableClass};

    use crate::schema::CtlTableClass;
    use crate::symtab::SymbolTable;

    fn port_table() -> CtlTableClass {
        CtlTableClass::new(
            TableClass::new(
                "Port",
                vec![
                    Column::new("name", ColumnType::scalar(AtomicType::String)),
                    Column::new(
                        "external_ids",
                        ColumnType::map(AtomicType::String, AtomicType::String, 0, rowctl_datum::UNBOUNDED),
                    ),
                ],
                false,
            ),
            vec![],
        )
    }

    #[test]
    fn key_form_overlays_a_single_map_entry() {
        let mut idl = Idl::new();
        idl.add_table(port_table().class);
        idl.declare_column("Port", "external_ids").unwrap();
        let mut txn = idl.open_txn();
        let row = idl.txn_insert(&mut txn, "Port", None).unwrap();
        idl.txn_write(
            &mut txn,
            &row,
            "external_ids",
            Datum::map(vec![(Atom::String("a".into()), Atom::String("1".into()))]).unwrap(),
        )
        .unwrap();
        idl.commit(&mut txn).unwrap();

        let table = port_table();
        let mut txn2 = idl.open_txn();
        let mut symtab = SymbolTable::new();
        let mut hook = || {};
        let mut ctx = CtlContext {
            idl: &mut idl,
            txn: &mut txn2,
            symtab: &mut symtab,
            tables: std::slice::from_ref(&table),
            cmd_show_tables: &[],
            invalidate_cache_hook: &mut hook,
            argv: vec!["Port".into(), row.uuid.to_string(), "external_ids:b=2".into()],
            options: Default::default(),
            output: String::new(),
            output_table: None,
            try_again: false,
            created_uuid: None,
        };
        run(&mut ctx).unwrap();
        let after = ctx.idl.read(ctx.txn, &row, "external_ids").unwrap();
        assert_eq!(after.len(), 2);
    }
}
