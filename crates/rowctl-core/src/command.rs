//! Component F: each verb as a `{ name, min_args, max_args, syntax_text,
//! options_spec, mode, pre, run, post? }` tuple (spec.md §4.F).

use crate::context::CtlContext;
use crate::error::CtlError;

/// `RO` commands never stage a write; `RW` commands may (component J's
/// `might_write_to_db` is a conservative syntactic check, not a dynamic
/// one, so it is driven off this tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ro,
    Rw,
}

pub type CommandFn = fn(&mut CtlContext) -> Result<(), CtlError>;

/// Upper bound meaning "no limit" for `max_args`.
pub const UNBOUNDED_ARGS: usize = usize::MAX;

/// A registered verb. `pre` declares the schema fragments `run` will read
/// (so the IDL's cache is populated before the transaction opens); `post`
/// is only present for `create`, to rewrite a provisional UUID into the
/// line already pushed to `ctx.output` (spec.md §4.I).
#[derive(Clone)]
pub struct Command {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub syntax_text: &'static str,
    pub options_spec: &'static str,
    pub mode: Mode,
    pub pre: CommandFn,
    pub run: CommandFn,
    pub post: Option<CommandFn>,
}

pub fn noop(_ctx: &mut CtlContext) -> Result<(), CtlError> {
    Ok(())
}
