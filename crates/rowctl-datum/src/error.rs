//! Error type for the value algebra.

use thiserror::Error;

/// Errors raised while parsing or validating [`crate::Atom`]/[`crate::Datum`]
/// values against a column's structural type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatumError {
    #[error("\"{value}\" is not a valid {expected}")]
    BadAtom { value: String, expected: &'static str },

    #[error("expected exactly one value, got {0}")]
    NotAScalar(usize),

    #[error("syntax error in value: {0}")]
    Syntax(String),

    #[error("duplicate key \"{0}\" in map literal")]
    DuplicateKey(String),

    #[error("unterminated quoted string")]
    UnterminatedString,

    #[error("invalid escape sequence \"\\{0}\" in quoted string")]
    BadEscape(char),
}
