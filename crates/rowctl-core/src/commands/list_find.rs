//! `list TABLE [RECORD]...` and `find TABLE [COND]...` (spec.md §4.F):
//! both render a table of cells, `find` additionally filtering rows by
//! AND'd conditions.

use rowctl_idl::{Row, TableClass};

use crate::command::{Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;
use crate::eval::Op;
use crate::names;
use crate::show::{format_datum, render_table};

use super::support::{declare_all_columns, eval_condition, is_uuid_pseudo_column, require_table, resolve_row};

fn requested_columns(table: &TableClass, spec: Option<&str>) -> Result<Vec<String>, CtlError> {
    match spec {
        None => {
            let mut cols = vec!["_uuid".to_string()];
            cols.extend(table.columns.iter().map(|c| c.name.clone()));
            Ok(cols)
        }
        Some(spec) => {
            let names_list: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
            spec.split(',')
                .map(|tok| {
                    let tok = tok.trim();
                    if is_uuid_pseudo_column(tok) {
                        return Ok("_uuid".to_string());
                    }
                    let matched = names::best_match(names_list.iter().copied(), tok)
                        .map_err(|amb| {
                            CtlError::schema(format!(
                                "{} contains more than one column whose name matches \"{}\"",
                                table.name, amb.query
                            ))
                        })?;
                    matched.map(str::to_string).ok_or_else(|| {
                        CtlError::schema(format!(
                            "{} does not contain a column whose name matches \"{}\"",
                            table.name, tok
                        ))
                    })
                })
                .collect()
        }
    }
}

fn render_rows(ctx: &mut CtlContext, rows: &[Row], columns: &[String]) -> Result<(), CtlError> {
    let mut grid = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(columns.len());
        for col in columns {
            if is_uuid_pseudo_column(col) || col == "_uuid" {
                cells.push(row.uuid.to_string());
            } else {
                let datum = ctx.idl.read(ctx.txn, row, col)?;
                cells.push(format_datum(&datum));
            }
        }
        grid.push(cells);
    }
    ctx.output_table = Some(render_table(columns, &grid));
    Ok(())
}

fn list_pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_all_columns(ctx, &table)
}

fn list_run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, &ctx.argv[0])?;
    let must_exist = !ctx.has_option("if-exists");
    let columns = requested_columns(&table.class, ctx.option_value("columns"))?;

    let records: Vec<String> = ctx.argv[1..].to_vec();
    let rows: Vec<Row> = if records.is_empty() {
        ctx.idl.rows(ctx.txn, table.name()).collect()
    } else {
        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(row) = resolve_row(ctx, &table, record, must_exist)? {
                rows.push(row);
            }
        }
        rows
    };

    render_rows(ctx, &rows, &columns)
}

pub fn list_command() -> Command {
    Command {
        name: "list",
        min_args: 1,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "list TABLE [RECORD]...",
        options_spec: "--if-exists,--columns=",
        mode: Mode::Ro,
        pre: list_pre,
        run: list_run,
        post: None,
    }
}

fn find_pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, ctx.arg(0).unwrap_or_default())?;
    declare_all_columns(ctx, &table)
}

fn find_run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let table = require_table(ctx, &ctx.argv[0])?;
    let columns = requested_columns(&table.class, ctx.option_value("columns"))?;
    let conditions: Vec<String> = ctx.argv[1..].to_vec();

    let op_tokens = Op::tokens();
    let mut matching = Vec::new();
    for row in ctx.idl.rows(ctx.txn, table.name()).collect::<Vec<_>>() {
        let mut all_true = true;
        for cond in &conditions {
            if !eval_condition(ctx, &table, &row, cond, &op_tokens)? {
                all_true = false;
                break;
            }
        }
        if all_true {
            matching.push(row);
        }
    }

    render_rows(ctx, &matching, &columns)
}

pub fn find_command() -> Command {
    Command {
        name: "find",
        min_args: 1,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "find TABLE [COND]...",
        options_spec: "--columns=",
        mode: Mode::Ro,
        pre: find_pre,
        run: find_run,
        post: None,
    }
}
