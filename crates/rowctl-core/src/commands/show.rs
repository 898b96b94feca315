//! `show` (spec.md §4.F/§4.H): renders the whole user-declared table-graph
//! rooted at `cmd_show_tables[0]`. Only registered when the embedder
//! supplies a non-empty `cmd_show_tables` (spec.md §4.J).

use crate::command::{Command, Mode};
use crate::context::CtlContext;
use crate::error::CtlError;
use crate::show::render_show;

use super::support::declare_all_columns;

fn pre(ctx: &mut CtlContext) -> Result<(), CtlError> {
    for table in ctx.tables.to_vec() {
        declare_all_columns(ctx, &table)?;
    }
    Ok(())
}

fn run(ctx: &mut CtlContext) -> Result<(), CtlError> {
    let rendered = render_show(ctx.idl, ctx.txn, ctx.cmd_show_tables)?;
    ctx.output.push_str(&rendered);
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "show",
        min_args: 0,
        max_args: 0,
        syntax_text: "show",
        options_spec: "",
        mode: Mode::Ro,
        pre,
        run,
        post: None,
    }
}
