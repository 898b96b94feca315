//! Error type for the IDL client layer.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdlError {
    #[error("table \"{0}\" was not declared during the pre-pass")]
    UndeclaredTable(String),

    #[error("column \"{0}\" of table \"{1}\" was not declared during the pre-pass")]
    UndeclaredColumn(String, String),

    #[error("column \"{0}\" is not mutable")]
    ReadOnlyColumn(String),

    #[error("row {0} does not exist")]
    NoSuchRow(uuid::Uuid),

    #[error("transaction commit failed: {0}")]
    CommitFailed(String),
}

/// Distinguishes the two non-error commit outcomes from the one error
/// outcome (spec.md §4.I: `commit txn -> {success, try_again_retry, error}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Success,
    TryAgainRetry,
}
