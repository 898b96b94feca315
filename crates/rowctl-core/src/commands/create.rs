//! `create TABLE COL[:KEY]=VALUE... (--id=@sym)` (spec.md §4.F): stage a
//! provisional row insert, apply each assignment like `set`, and emit the
//! provisional UUID (rewritten to the committed UUID by `post`).

use tracing::warn;

use crate::arg;
use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;

use super::support::{declare_resolution_columns, require_table, substitute_symbols};

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_resolution_columns(ctx, &table)?;
    let assignments: Vec<String> = ctx.argv[1..].to_vec();
    for token in &assignments {
        let parsed = arg::parse_column_key_value(token, &table.class, &["="], true)?;
        ctx.idl.declare_column(table.name(), &parsed.column.name)?;
    }
    Ok(())
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, &ctx.argv[0])?;

    if !table.class.is_root && !ctx.has_option("id") {
        warn!(
            table = table.name(),
            "creating a row of a non-root table with no --id binding it to a symbol; \
             it will be garbage-collected once this transaction commits"
        );
    }

    let row = ctx.idl.txn_insert(ctx.txn, table.name(), None)?;
    ctx.created_uuid = Some(row.uuid);

    if let Some(sym) = ctx.option_value("id").map(str::to_string) {
        ctx.symtab.create_symbol(&sym, row.uuid)?;
    }

    let assignments: Vec<String> = ctx.argv[1..].to_vec();
    for token in &assignments {
        let parsed = arg::parse_column_key_value(token, &table.class, &["="], true)?;
        let column_name = parsed.column.name.clone();
        let column_ty = parsed.column.ty.clone();
        let raw_value = parsed.value.as_deref().unwrap_or("");
        let substituted = substitute_symbols(raw_value, ctx.symtab)?;

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

    ctx.push_line(row.uuid.to_string());
    Ok(())
}

/// Rewrite the provisional UUID `run` pushed to `ctx.output` into the
/// committed one the transaction's `commit` assigned (spec.md §4.I).
fn post(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let Some(provisional) = ctx.created_uuid else {
        return Ok(());
    };
    if let Some(committed) = ctx.idl.txn_get_insert_uuid(ctx.txn, provisional) {
        ctx.output = ctx.output.replace(&provisional.to_string(), &committed.to_string());
    }
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "create",
        min_args: 1,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "create TABLE COLUMN[:KEY]=VALUE...",
        options_spec: "--id=",
        mode: Mode::Rw,
        pre,
        run,
        post: Some(post),
    }
}
