//! Component J (registry & init) and component I (execution driver),
//! spec.md §4.I/§4.J.

use std::collections::HashMap;

use rowctl_idl::Idl;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::command::{Command, Mode};
use crate::commands;
use crate::context::CtlContext;
use crate::error::CtlError;
use crate::schema::{CmdShowTable, CtlTableClass};
use crate::stream::{self, ParsedCommand};
use crate::symtab::SymbolTable;

/// The immutable, process-wide value spec.md §9 calls for in place of the
/// source's global mutable registries (`all_commands`, `tables`,
/// `cmd_show_tables`, `exit_hook`): built once by [`Interpreter::init`] and
/// passed by reference into parsing and execution thereafter.
pub struct Interpreter {
    tables: Vec<CtlTableClass>,
    cmd_show_tables: Vec<CmdShowTable>,
    commands: Vec<Command>,
    exit_hook: Option<Box<dyn Fn() + Send + Sync>>,
}

impl Interpreter {
    /// Register the schema descriptors and the eleven built-in verbs; if
    /// `cmd_show_tables` is non-empty, also register `show` (spec.md
    /// §4.J). `exit_hook`, if given, is the caller's process-exit
    /// callback — this crate never calls it itself (per spec.md §9's
    /// redesign note, errors propagate as `Result`, not a non-local exit);
    /// it is here only so an embedder's `main` can retrieve and invoke it
    /// on a fatal `CtlError`, mirroring spec.md §7's "calls the installed
    /// exit hook".
    pub fn init(
        tables: Vec<CtlTableClass>,
        cmd_show_tables: Vec<CmdShowTable>,
        exit_hook: Option<Box<dyn Fn() + Send + Sync>>,
    ) -> Self {
        let mut commands = commands::builtin_commands();
        if !cmd_show_tables.is_empty() {
            commands.push(commands::show_command());
        }
        Interpreter {
            tables,
            cmd_show_tables,
            commands,
            exit_hook,
        }
    }

    pub fn tables(&self) -> &[CtlTableClass] {
        &self.tables
    }

    pub fn cmd_show_tables(&self) -> &[CmdShowTable] {
        &self.cmd_show_tables
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn exit_hook(&self) -> Option<&(dyn Fn() + Send + Sync)> {
        self.exit_hook.as_deref()
    }

    /// Add embedder-defined verbs to the registry. Fatal on a name
    /// collision with an already-registered verb (spec.md §4.J).
    pub fn register_commands(&mut self, extra: Vec<Command>) -> Result<(), CtlError> {
        for cmd in extra {
            if self.commands.iter().any(|c| c.name == cmd.name) {
                return Err(CtlError::usage(format!(
                    "command \"{}\" is already registered",
                    cmd.name
                )));
            }
            self.commands.push(cmd);
        }
        Ok(())
    }

    /// Conservative syntactic hint: true if any token in `argv` names a
    /// registered RW verb (spec.md §4.J).
    pub fn might_write_to_db(&self, argv: &[String]) -> bool {
        let rw_names: std::collections::HashSet<&str> = self
            .commands
            .iter()
            .filter(|c| c.mode == Mode::Rw)
            .map(|c| c.name)
            .collect();
        argv.iter().any(|tok| rw_names.contains(tok.as_str()))
    }

    /// Run one command stream to completion: pre-pass, transactional
    /// execution with `try_again` retry, commit, post-pass, per spec.md
    /// §4.I. Returns the concatenated output of every command, in argv
    /// order. `wait_for_change` is the caller-supplied blocking hook
    /// invoked between retries (spec.md §5's "sleep-for-IDL-change" step);
    /// `invalidate_cache_hook` is invoked after any RW command and again
    /// once the stream completes.
    #[instrument(skip_all)]
    pub fn run(
        &self,
        idl: &mut Idl,
        tokens: &[String],
        local_options: HashMap<String, Option<String>>,
        invalidate_cache_hook: &mut dyn FnMut(),
        mut wait_for_change: impl FnMut() -> Result<(), CtlError>,
    ) -> Result<String, CtlError> {
        let parsed = stream::parse_stream(tokens, local_options, &self.commands)?;
        let resolved: Vec<(&Command, ParsedCommand)> = parsed
            .into_iter()
            .map(|p| {
                let command = self
                    .commands
                    .iter()
                    .find(|c| c.name == p.command_name)
                    .expect("the stream parser only ever returns registered verb names");
                (command, p)
            })
            .collect();

        self.run_pre_pass(idl, &resolved)?;

        let mut outputs: Vec<String> = vec![String::new(); resolved.len()];
        let mut output_tables: Vec<Option<String>> = vec![None; resolved.len()];
        let mut created_uuids: Vec<Option<Uuid>> = vec![None; resolved.len()];

        loop {
            let mut txn = idl.open_txn();
            let mut symtab = SymbolTable::new();
            let mut retry = false;

            for (i, (command, parsed)) in resolved.iter().enumerate() {
                let mut ctx = CtlContext {
                    idl: &mut *idl,
                    txn: &mut txn,
                    symtab: &mut symtab,
                    tables: &self.tables,
                    cmd_show_tables: &self.cmd_show_tables,
                    invalidate_cache_hook: &mut *invalidate_cache_hook,
                    argv: parsed.argv.clone(),
                    options: parsed.options.clone(),
                    output: String::new(),
                    output_table: None,
                    try_again: false,
                    created_uuid: None,
                };
                (command.run)(&mut ctx)?;
                if command.mode == Mode::Rw {
                    (ctx.invalidate_cache_hook)();
                }
                if ctx.try_again {
                    retry = true;
                    break;
                }
                outputs[i] = ctx.output;
                output_tables[i] = ctx.output_table;
                created_uuids[i] = ctx.created_uuid;
            }

            if retry {
                drop(txn);
                wait_for_change()?;
                continue;
            }

            match idl.commit(&mut txn)? {
                rowctl_idl::CommitOutcome::Success => {}
                rowctl_idl::CommitOutcome::TryAgainRetry => {
                    info!("commit reported optimistic-concurrency conflict, retrying");
                    wait_for_change()?;
                    continue;
                }
            }

            for (i, (command, parsed)) in resolved.iter().enumerate() {
                let Some(post_fn) = command.post else {
                    continue;
                };
                let mut ctx = CtlContext {
                    idl: &mut *idl,
                    txn: &mut txn,
                    symtab: &mut symtab,
                    tables: &self.tables,
                    cmd_show_tables: &self.cmd_show_tables,
                    invalidate_cache_hook: &mut *invalidate_cache_hook,
                    argv: parsed.argv.clone(),
                    options: parsed.options.clone(),
                    output: outputs[i].clone(),
                    output_table: output_tables[i].clone(),
                    try_again: false,
                    created_uuid: created_uuids[i],
                };
                post_fn(&mut ctx)?;
                outputs[i] = ctx.output;
            }

            (invalidate_cache_hook)();
            return Ok(outputs.join(""));
        }
    }

    fn run_pre_pass(&self, idl: &mut Idl, resolved: &[(&Command, ParsedCommand)]) -> Result<(), CtlError> {
        let mut pre_txn = idl.open_txn();
        let mut pre_symtab = SymbolTable::new();
        let mut noop_hook = || {};
        for (command, parsed) in resolved {
            let mut ctx = CtlContext {
                idl: &mut *idl,
                txn: &mut pre_txn,
                symtab: &mut pre_symtab,
                tables: &self.tables,
                cmd_show_tables: &self.cmd_show_tables,
                invalidate_cache_hook: &mut noop_hook,
                argv: parsed.argv.clone(),
                options: parsed.options.clone(),
                output: String::new(),
                output_table: None,
                try_again: false,
                created_uuid: None,
            };
            (command.pre)(&mut ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowctl_datum::{AtomicType, ColumnType};
    use rowctl_idl::{Column, TableClass};

    fn demo_tables() -> Vec<CtlTableClass> {
        vec![
            CtlTableClass::new(
                TableClass::new(
                    "Bridge",
                    vec![
                        Column::new("name", ColumnType::scalar(AtomicType::String)),
                        Column::new(
                            "ports",
                            ColumnType::set(AtomicType::Uuid, 0, rowctl_datum::UNBOUNDED)
                                .with_key_ref("Port"),
                        ),
                    ],
                    true,
                ),
                vec![crate::schema::RowIdDescriptor::named("Bridge", "name")],
            ),
            CtlTableClass::new(
                TableClass::new(
                    "Port",
                    vec![
                        Column::new("name", ColumnType::scalar(AtomicType::String)),
                        Column::new("tag", ColumnType::optional_scalar(AtomicType::Integer)),
                    ],
                    false,
                ),
                vec![crate::schema::RowIdDescriptor::named("Port", "name")],
            ),
        ]
    }

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn create_and_reference_commits_in_one_stream() {
        let interp = Interpreter::init(demo_tables(), vec![], None);
        let mut idl = Idl::new();
        for t in interp.tables() {
            idl.add_table(t.class.clone());
        }
        let tokens = toks("--id=@p create Port name=eth0 -- create Bridge name=br0 ports=@p");
        let mut hook = || {};
        let output = interp
            .run(&mut idl, &tokens, HashMap::new(), &mut hook, || Ok(()))
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(Uuid::parse_str(lines[0]).is_ok());
        assert!(Uuid::parse_str(lines[1]).is_ok());

        let txn = idl.open_txn();
        let bridges: Vec<_> = idl.rows(&txn, "Bridge").collect();
        assert_eq!(bridges.len(), 1);
        let ports = idl.read(&txn, &bridges[0], "ports").unwrap();
        assert_eq!(ports.len(), 1);
    }

    #[test]
    fn might_write_to_db_detects_rw_verbs() {
        let interp = Interpreter::init(demo_tables(), vec![], None);
        assert!(interp.might_write_to_db(&toks("create Port name=eth0")));
        assert!(!interp.might_write_to_db(&toks("get Port eth0 name")));
    }

    #[test]
    fn register_commands_rejects_name_collision() {
        let mut interp = Interpreter::init(demo_tables(), vec![], None);
        let dup = Command {
            name: "get",
            min_args: 0,
            max_args: crate::command::UNBOUNDED_ARGS,
            syntax_text: "get ...",
            options_spec: "",
            mode: Mode::Ro,
            pre: crate::command::noop,
            run: crate::command::noop,
            post: None,
        };
        assert!(interp.register_commands(vec![dup]).is_err());
    }
}
