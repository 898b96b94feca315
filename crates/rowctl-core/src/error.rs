//! The single choke-point error type of the interpreter.
//!
//! spec.md §7 describes a `fatal()`/`die_if_error` pattern that performs a
//! non-local exit. Per spec.md §9's redesign note, this crate re-architects
//! that as a propagated [`CtlError`] through every command's call graph;
//! only `rowctl-cli`'s `main` maps it to a process exit code.

use thiserror::Error;

use rowctl_datum::DatumError;
use rowctl_idl::IdlError;

/// Every error kind named in spec.md §7, grouped under one enum so the
/// execution driver has a single `Result<_, CtlError>` to propagate.
#[derive(Debug, Error)]
pub enum CtlError {
    /// Unknown verb, bad option, wrong arg count, mutually exclusive
    /// options, missing value.
    #[error("{0}")]
    Usage(String),

    /// Unknown table/column, ambiguous prefix match.
    #[error("{0}")]
    Schema(String),

    /// Record not found, multiple rows match a name, symbol redefinition,
    /// forward-used symbol.
    #[error("{0}")]
    Resolution(String),

    /// Datum parse failure, key on non-map column, cardinality violation.
    #[error("{0}")]
    Type(String),

    /// Write to read-only column, `clear` on a mandatory column.
    #[error("{0}")]
    Semantic(String),

    /// IDL transaction commit error or other environment failure.
    #[error("{0}")]
    Environment(String),
}

impl CtlError {
    pub fn usage(msg: impl Into<String>) -> Self {
        CtlError::Usage(msg.into())
    }
    pub fn schema(msg: impl Into<String>) -> Self {
        CtlError::Schema(msg.into())
    }
    pub fn resolution(msg: impl Into<String>) -> Self {
        CtlError::Resolution(msg.into())
    }
    pub fn type_error(msg: impl Into<String>) -> Self {
        CtlError::Type(msg.into())
    }
    pub fn semantic(msg: impl Into<String>) -> Self {
        CtlError::Semantic(msg.into())
    }
    pub fn environment(msg: impl Into<String>) -> Self {
        CtlError::Environment(msg.into())
    }
}

impl From<DatumError> for CtlError {
    fn from(e: DatumError) -> Self {
        CtlError::Type(e.to_string())
    }
}

impl From<IdlError> for CtlError {
    fn from(e: IdlError) -> Self {
        match e {
            IdlError::ReadOnlyColumn(_) => CtlError::Semantic(e.to_string()),
            IdlError::UndeclaredTable(_) | IdlError::UndeclaredColumn(..) => {
                CtlError::Schema(e.to_string())
            }
            IdlError::NoSuchRow(_) => CtlError::Resolution(e.to_string()),
            IdlError::CommitFailed(_) => CtlError::Environment(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datum_errors_surface_as_type_errors() {
        let e: CtlError = DatumError::NotAScalar(2).into();
        assert!(matches!(e, CtlError::Type(_)));
    }
}
