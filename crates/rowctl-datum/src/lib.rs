//! Typed value algebra for rowctl columns.
//!
//! This crate is the concrete stand-in for the "datum parsing/printing
//! primitives" spec.md lists as an assumed-available external collaborator:
//! [`Atom`] (a scalar) and [`Datum`] (a column's full value — scalar, set,
//! or map), plus the structural [`ColumnType`] that governs how a literal
//! parses and how many elements a datum may hold.

mod atom;
mod column_type;
mod datum;
mod error;
pub mod lexer;

pub use atom::{Atom, AtomicType};
pub use column_type::{ColumnType, UNBOUNDED};
pub use datum::Datum;
pub use error::DatumError;
