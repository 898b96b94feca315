//! `get TABLE RECORD [COLUMN[:KEY]]...` (spec.md §4.F).

use crate::arg;
use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;
use crate::show::format_datum;

use super::support::{declare_resolution_columns, is_uuid_pseudo_column, require_table, resolve_row};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_resolution_columns(ctx, &table)?;
    let columns: Vec<String> = ctx.argv[2..].to_vec();
    for token in &columns {
        if is_uuid_pseudo_column(token) {
            continue;
        }
        let parsed = arg::parse_column_key_value(token, &table.class, &[], false)?;
        ctx.idl.declare_column(table.name(), &parsed.column.name)?;
    }
    Ok(())
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    if ctx.has_option("if-exists") && ctx.has_option("id") {
        return Err(CtlError::usage("--if-exists and --id are mutually exclusive"));
    }
    let table = require_table(ctx, &ctx.argv[0])?;
    let record = ctx.argv[1].clone();
    let must_exist = !ctx.has_option("if-exists");

    let row = match resolve_row(ctx, &table, &record, must_exist)? {
        Some(row) => row,
        None => return Ok(()),
    };

    if let Some(sym) = ctx.option_value("id").map(str::to_string) {
        ctx.symtab.create_symbol(&sym, row.uuid)?;
    }

    let columns: Vec<String> = ctx.argv[2..].to_vec();
    for token in &columns {
        if is_uuid_pseudo_column(token) {
            ctx.push_line(row.uuid.to_string());
            continue;
        }
        let parsed = arg::parse_column_key_value(token, &table.class, &[], false)?;
        let datum = ctx.idl.read(ctx.txn, &row, &parsed.column.name)?;
        let value = match &parsed.key {
            Some(key) => {
                let key_atom = rowctl_datum::Atom::parse(key, parsed.column.ty.key_type)?;
                datum.value_at_key(&key_atom)
            }
            None => datum,
        };
        ctx.push_line(format_datum(&value));
    }
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "get",
        min_args: 2,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "get TABLE RECORD [COLUMN[:KEY]]...",
        options_spec: "--if-exists,--id=",
        mode: Mode::Ro,
        pre,
        run,
        post: None,
    }
}
