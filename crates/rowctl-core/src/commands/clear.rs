//! `clear TABLE RECORD COLUMN...` (spec.md §4.F): reset a column to the
//! empty datum, refusing columns that require at least one value.

use crate::arg;
use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;

use super::support::{declare_resolution_columns, require_table, resolve_row};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_resolution_columns(ctx, &table)?;
    let columns: Vec<String> = ctx.argv[2..].to_vec();
    for token in &columns {
        let parsed = arg::parse_column_key_value(token, &table.class, &[], false)?;
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

    let columns: Vec<String> = ctx.argv[2..].to_vec();
    for token in &columns {
        let parsed = arg::parse_column_key_value(token, &table.class, &[], false)?;
        let column_name = parsed.column.name.clone();
        if parsed.column.ty.n_min > 0 {
            return Err(CtlError::semantic(format!(
                "{column_name} requires at least {} value(s), cannot be cleared",
                parsed.column.ty.n_min
            )));
        }
        ctx.idl.txn_verify(ctx.txn, &row, &column_name);
        ctx.idl.txn_write(ctx.txn, &row, &column_name, rowctl_datum::Datum::empty())?;
    }
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "clear",
        min_args: 3,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "clear TABLE RECORD COLUMN...",
        options_spec: "--if-exists",
        mode: Mode::Rw,
        pre,
        run,
        post: None,
    }
}
