//! `remove TABLE RECORD COLUMN VALUE...` (spec.md §4.F): subtract elements
//! from a set or map column, enforcing the lower cardinality bound. A map
//! column accepts either `KEY=VALUE` pairs or bare keys (spec.md §4.F's
//! remove-by-key retry, via `Datum::parse_key_set`).

use rowctl_datum::{Datum, UNBOUNDED};

use crate::arg;
use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;

use super::support::{declare_resolution_columns, require_table, resolve_row, substitute_symbols};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_resolution_columns(ctx, &table)?;
    let column_tok = ctx.arg(2).unwrap_or_default();
    let parsed = arg::parse_column_key_value(column_tok, &table.class, &[], false)?;
    ctx.idl.declare_column(table.name(), &parsed.column.name)?;
    Ok(())
}

fn parse_operand(text: &str, column_ty: &rowctl_datum::ColumnType) -> Result<Datum, CtlError> {
    let operand_ty = column_ty.with_bounds(0, UNBOUNDED);
    match Datum::parse(text, &operand_ty) {
        Ok(d) => Ok(d),
        Err(e) if column_ty.is_map() => Datum::parse_key_set(text, &operand_ty).map_err(|_| e.into()),
        Err(e) => Err(e.into()),
    }
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, &ctx.argv[0])?;
    let record = ctx.argv[1].clone();
    let must_exist = !ctx.has_option("if-exists");

    let row = match resolve_row(ctx, &table, &record, must_exist)? {
        Some(row) => row,
        None => return Ok(()),
    };

    let column_tok = ctx.argv[2].clone();
    let parsed = arg::parse_column_key_value(&column_tok, &table.class, &[], false)?;
    let column_name = parsed.column.name.clone();
    let column_ty = parsed.column.ty.clone();
    if column_ty.is_scalar() {
        return Err(CtlError::type_error(format!(
            "{column_name} is a scalar column, cannot be removed from"
        )));
    }

    ctx.idl.txn_verify(ctx.txn, &row, &column_name);
    let mut current = ctx.idl.read(ctx.txn, &row, &column_name)?;
    for value in &ctx.argv[3..] {
        let substituted = substitute_symbols(value, ctx.symtab)?;
        let operand = parse_operand(&substituted, &column_ty)?;
        current = current.subtract(&operand);
    }
    current.check_cardinality(&column_ty)?;
    ctx.idl.txn_write(ctx.txn, &row, &column_name, current)?;
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "remove",
        min_args: 4,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "remove TABLE RECORD COLUMN VALUE...",
        options_spec: "--if-exists",
        mode: Mode::Rw,
        pre,
        run,
        post: None,
    }
}
