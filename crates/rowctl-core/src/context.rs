//! `CtlContext`: threads through the execution of one command
//! (spec.md §3).

use std::collections::HashMap;

use rowctl_idl::{Idl, Transaction};
use uuid::Uuid;

use crate::schema::{CmdShowTable, CtlTableClass};
use crate::symtab::SymbolTable;

/// Everything one command's `pre`/`run`/`post` needs, per spec.md §3.
///
/// Lives for one transaction attempt: the execution driver (component I)
/// builds a fresh `symtab` and clears `try_again`/`output` on every retry,
/// per spec.md §5 ("the whole command stream ... is discarded and rerun").
pub struct CtlContext<'a> {
    pub idl: &'a mut Idl,
    pub txn: &'a mut Transaction,
    pub symtab: &'a mut SymbolTable,
    pub tables: &'a [CtlTableClass],
    pub cmd_show_tables: &'a [CmdShowTable],

    /// Invoked after any RW command, and again after the stream completes,
    /// so product-specific caches can rebuild (spec.md §4.I).
    pub invalidate_cache_hook: &'a mut dyn FnMut(),

    pub argv: Vec<String>,
    pub options: HashMap<String, Option<String>>,

    pub output: String,
    /// Set by `list`/`find`/`show`'s tabular renderers; `None` for commands
    /// that only emit line-oriented text (`get`, `create`).
    pub output_table: Option<String>,

    /// Set by `wait-until` (or detected by the driver on commit conflict)
    /// to request a full stream re-run (spec.md §4.I/§5).
    pub try_again: bool,

    /// The execution driver's side channel carrying `create`'s provisional
    /// row UUID from its `run` call to its `post` call, so `post` can
    /// rewrite the already-buffered output line into the committed UUID
    /// (spec.md §4.I). `None` for every other verb.
    pub created_uuid: Option<Uuid>,
}

impl<'a> CtlContext<'a> {
    pub fn table(&self, name: &str) -> Option<&CtlTableClass> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.argv.get(index).map(String::as_str)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.options.get(name)?.as_deref()
    }

    pub fn push_line(&mut self, line: impl AsRef<str>) {
        self.output.push_str(line.as_ref());
        self.output.push('\n');
    }
}
