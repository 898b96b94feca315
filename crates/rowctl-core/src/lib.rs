//! `rowctl-core`: a generic command interpreter for a typed, row-oriented
//! database accessed through a caching, transactional IDL client.
//!
//! See each module for the component it implements; component letters
//! (A–J) below refer to this crate's own component design, not any
//! external numbering.

pub mod arg; // B: argument parser
pub mod command; // F: command implementations
pub mod commands;
pub mod completion; // bash-completion line format
pub mod context;
mod error;
pub mod eval; // E: type-aware evaluator
pub mod interpreter; // J: registry & init
pub mod names; // A: name matcher
pub mod resolver; // C: row resolver
pub mod schema;
pub mod show; // H: show renderer
pub mod stream; // G: command-stream parser
pub mod symtab; // D: symbol table

pub use context::CtlContext;
pub use error::CtlError;
pub use interpreter::Interpreter;
pub use schema::{CmdShowTable, CtlTableClass, RowIdDescriptor, WrefTable};
