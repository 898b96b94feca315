//! `destroy TABLE [RECORD]... (--if-exists, --all)` (spec.md §4.F).

use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;

use super::support::{declare_resolution_columns, require_table, resolve_row};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_resolution_columns(ctx, &table)
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let all = ctx.has_option("all");
    let if_exists = ctx.has_option("if-exists");
    let records: Vec<String> = ctx.argv[1..].to_vec();

    if all && !records.is_empty() {
        return Err(CtlError::usage("--all and RECORD arguments are mutually exclusive"));
    }
    if all && if_exists {
        return Err(CtlError::usage("--all and --if-exists are mutually exclusive"));
    }

    let table = require_table(ctx, &ctx.argv[0])?;

    if all {
        for row in ctx.idl.rows(ctx.txn, table.name()).collect::<Vec<_>>() {
            ctx.idl.txn_delete(ctx.txn, &row);
        }
        return Ok(());
    }

    let must_exist = !if_exists;
    for record in &records {
        if let Some(row) = resolve_row(ctx, &table, record, must_exist)? {
            ctx.idl.txn_delete(ctx.txn, &row);
        }
    }
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "destroy",
        min_args: 1,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "destroy TABLE [RECORD]...",
        options_spec: "--if-exists,--all",
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
                vec![Column::new("name", ColumnType::scalar(AtomicType::String))],
                false,
            ),
            vec![],
        )
    }

    fn ctx_for<'a>(
        idl: &'a mut Idl,
        txn: &'a mut rowctl_idl::Transaction,
        symtab: &'a mut SymbolTable,
        tables: &'a [CtlTableClass],
        hook: &'a mut dyn FnMut(),
        argv: Vec<String>,
        options: std::collections::HashMap<String, Option<String>>,
    ) -> CtlContext<'a> {
        CtlContext {
            idl,
            txn,
            symtab,
            tables,
            cmd_show_tables: &[],
            invalidate_cache_hook: hook,
            argv,
            options,
            output: String::new(),
            output_table: None,
            try_again: false,
            created_uuid: None,
        }
    }

    #[test]
    fn all_and_records_are_mutually_exclusive() {
        let mut idl = Idl::new();
        idl.add_table(port_table().class);
        let mut txn = idl.open_txn();
        let mut symtab = SymbolTable::new();
        let table = port_table();
        let mut hook = || {};
        let mut options = std::collections::HashMap::new();
        options.insert("all".to_string(), None);
        let mut ctx = ctx_for(
            &mut idl,
            &mut txn,
            &mut symtab,
            std::slice::from_ref(&table),
            &mut hook,
            vec!["Port".into(), "eth0".into()],
            options,
        );
        assert!(run(&mut ctx).is_err());
    }

    #[test]
    fn all_deletes_every_row() {
        let mut idl = Idl::new();
        idl.add_table(port_table().class);
        idl.declare_column("Port", "name").unwrap();
        let mut setup = idl.open_txn();
        let a = idl.txn_insert(&mut setup, "Port", None).unwrap();
        idl.txn_write(&mut setup, &a, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        idl.commit(&mut setup).unwrap();

        let mut txn = idl.open_txn();
        let mut symtab = SymbolTable::new();
        let table = port_table();
        let mut hook = || {};
        let mut options = std::collections::HashMap::new();
        options.insert("all".to_string(), None);
        let mut ctx = ctx_for(
            &mut idl,
            &mut txn,
            &mut symtab,
            std::slice::from_ref(&table),
            &mut hook,
            vec!["Port".into()],
            options,
        );
        run(&mut ctx).unwrap();
        assert_eq!(ctx.idl.rows(ctx.txn, "Port").count(), 0);
    }
}
