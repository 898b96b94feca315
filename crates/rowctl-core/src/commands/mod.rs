//! The eleven verb implementations of spec.md §4.F, plus `show`'s command
//! wrapper (component H, registered conditionally — spec.md §4.J).

mod add;
mod clear;
mod comment;
mod create;
mod destroy;
mod get;
mod list_find;
mod remove;
mod set;
pub(crate) mod support;
mod wait_until;

#[path = "show.rs"]
mod show_command;

use crate::command::Command;

/// The eleven verbs every `Interpreter` registers unconditionally
/// (spec.md §4.J: `init` "registers the eleven verbs").
pub fn builtin_commands() -> Vec<Command> {
    vec![
        comment::command(),
        get::command(),
        list_find::list_command(),
        list_find::find_command(),
        set::command(),
        add::command(),
        remove::command(),
        clear::command(),
        create::command(),
        destroy::command(),
        wait_until::command(),
    ]
}

/// `show` is only registered when the embedder supplies `cmd_show_tables`
/// (spec.md §4.J: "if `cmd_show_tables` is non-null, registers `show`").
pub fn show_command() -> Command {
    show_command::command()
}
