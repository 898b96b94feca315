//! `wait-until TABLE RECORD [COND]...` (spec.md §4.F): RO. If the row is
//! missing or any condition is false, requests a full stream re-run via
//! `ctx.try_again` instead of erroring (spec.md §4.I/§5).

use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;
use crate::eval::Op;

use super::support::{declare_all_columns, eval_condition, require_table, resolve_row};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_all_columns(ctx, &table)
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, &ctx.argv[0])?;
    let record = ctx.argv[1].clone();

    let row = match resolve_row(ctx, &table, &record, false)? {
        Some(row) => row,
        None => {
            ctx.try_again = true;
            return Ok(());
        }
    };

    let op_tokens = Op::tokens();
    let conditions: Vec<String> = ctx.argv[2..].to_vec();
    for cond in &conditions {
        if !eval_condition(ctx, &table, &row, cond, &op_tokens)? {
            ctx.try_again = true;
            return Ok(());
        }
    }
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "wait-until",
        min_args: 2,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "wait-until TABLE RECORD [COND]...",
        options_spec: "",
        mode: Mode::Ro,
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
                    Column::new("tag", ColumnType::optional_scalar(AtomicType::Integer)),
                ],
                false,
            ),
            vec![crate::schema::RowIdDescriptor::named("Port", "name")],
        )
    }

    fn ctx_for<'a>(
        idl: &'a mut Idl,
        txn: &'a mut rowctl_idl::Transaction,
        symtab: &'a mut SymbolTable,
        tables: &'a [CtlTableClass],
        hook: &'a mut dyn FnMut(),
        argv: Vec<String>,
    ) -> CtlContext<'a> {
        CtlContext {
            idl,
            txn,
            symtab,
            tables,
            cmd_show_tables: &[],
            invalidate_cache_hook: hook,
            argv,
            options: Default::default(),
            output: String::new(),
            output_table: None,
            try_again: false,
            created_uuid: None,
        }
    }

    #[test]
    fn missing_row_requests_retry_instead_of_erroring() {
        let mut idl = Idl::new();
        idl.add_table(port_table().class);
        idl.declare_column("Port", "name").unwrap();
        idl.declare_column("Port", "tag").unwrap();
        let mut txn = idl.open_txn();
        let mut symtab = SymbolTable::new();
        let table = port_table();
        let mut hook = || {};
        let mut ctx = ctx_for(
            &mut idl,
            &mut txn,
            &mut symtab,
            std::slice::from_ref(&table),
            &mut hook,
            vec!["Port".into(), "eth0".into()],
        );
        run(&mut ctx).unwrap();
        assert!(ctx.try_again);
    }

    #[test]
    fn false_condition_requests_retry() {
        let mut idl = Idl::new();
        idl.add_table(port_table().class);
        idl.declare_column("Port", "name").unwrap();
        idl.declare_column("Port", "tag").unwrap();
        let mut setup = idl.open_txn();
        let row = idl.txn_insert(&mut setup, "Port", None).unwrap();
        idl.txn_write(&mut setup, &row, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        idl.txn_write(&mut setup, &row, "tag", Datum::scalar(Atom::Integer(5))).unwrap();
        idl.commit(&mut setup).unwrap();

        let mut txn = idl.open_txn();
        let mut symtab = SymbolTable::new();
        let table = port_table();
        let mut hook = || {};
        let mut ctx = ctx_for(
            &mut idl,
            &mut txn,
            &mut symtab,
            std::slice::from_ref(&table),
            &mut hook,
            vec!["Port".into(), "eth0".into(), "tag=10".into()],
        );
        run(&mut ctx).unwrap();
        assert!(ctx.try_again);
    }

    #[test]
    fn satisfied_condition_does_not_request_retry() {
        let mut idl = Idl::new();
        idl.add_table(port_table().class);
        idl.declare_column("Port", "name").unwrap();
        idl.declare_column("Port", "tag").unwrap();
        let mut setup = idl.open_txn();
        let row = idl.txn_insert(&mut setup, "Port", None).unwrap();
        idl.txn_write(&mut setup, &row, "name", Datum::scalar(Atom::String("eth0".into()))).unwrap();
        idl.txn_write(&mut setup, &row, "tag", Datum::scalar(Atom::Integer(10))).unwrap();
        idl.commit(&mut setup).unwrap();

        let mut txn = idl.open_txn();
        let mut symtab = SymbolTable::new();
        let table = port_table();
        let mut hook = || {};
        let mut ctx = ctx_for(
            &mut idl,
            &mut txn,
            &mut symtab,
            std::slice::from_ref(&table),
            &mut hook,
            vec!["Port".into(), "eth0".into(), "tag=10".into()],
        );
        run(&mut ctx).unwrap();
        assert!(!ctx.try_again);
    }
}
