//! `comment`: a documentation no-op, any arguments accepted (spec.md §4.F).

use crate::command::{noop, Command, Mode, UNBOUNDED_ARGS};
use crate::context::CtlContext;
use crate::error::CtlError;

fn run(_ctx: &mut CtlContext) -> Result<(), CtlError> {
    Ok(())
}

pub fn command() -> Command {
    Command {
        name: "comment",
        min_args: 0,
        max_args: UNBOUNDED_ARGS,
        syntax_text: "comment [arg]...",
        options_spec: "",
        mode: Mode::Ro,
        pre: noop,
        run,
        post: None,
    }
}
