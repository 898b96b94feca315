//! Structural type of a column: scalar, set, or map.

use serde::{Deserialize, Serialize};

use crate::atom::AtomicType;

/// Sentinel for "no upper bound on cardinality".
pub const UNBOUNDED: usize = usize::MAX;

/// `{ key_atomic_type, value_atomic_type_or_NONE, n_min, n_max,
/// key_ref_target?, value_ref_target? }` from spec.md §3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub key_type: AtomicType,
    pub value_type: Option<AtomicType>,
    pub n_min: usize,
    pub n_max: usize,
    /// Name of the table a `Uuid`-typed key references, if any.
    pub key_ref_target: Option<String>,
    /// Name of the table a `Uuid`-typed value references, if any.
    pub value_ref_target: Option<String>,
}

impl ColumnType {
    pub fn scalar(key_type: AtomicType) -> Self {
        ColumnType {
            key_type,
            value_type: None,
            n_min: 1,
            n_max: 1,
            key_ref_target: None,
            value_ref_target: None,
        }
    }

    pub fn optional_scalar(key_type: AtomicType) -> Self {
        ColumnType {
            n_min: 0,
            ..Self::scalar(key_type)
        }
    }

    pub fn set(key_type: AtomicType, n_min: usize, n_max: usize) -> Self {
        ColumnType {
            key_type,
            value_type: None,
            n_min,
            n_max,
            key_ref_target: None,
            value_ref_target: None,
        }
    }

    pub fn map(key_type: AtomicType, value_type: AtomicType, n_min: usize, n_max: usize) -> Self {
        ColumnType {
            key_type,
            value_type: Some(value_type),
            n_min,
            n_max,
            key_ref_target: None,
            value_ref_target: None,
        }
    }

    pub fn with_key_ref(mut self, table: impl Into<String>) -> Self {
        self.key_ref_target = Some(table.into());
        self
    }

    pub fn with_value_ref(mut self, table: impl Into<String>) -> Self {
        self.value_ref_target = Some(table.into());
        self
    }

    pub fn is_map(&self) -> bool {
        self.value_type.is_some()
    }

    pub fn is_scalar(&self) -> bool {
        self.value_type.is_none() && self.n_max == 1
    }

    pub fn is_set(&self) -> bool {
        !self.is_map() && !self.is_scalar()
    }

    /// The same type with cardinality widened to `[0, UNBOUNDED]`, used when
    /// comparing a row's datum against a user-supplied literal of any size
    /// (spec.md §4.E: "Column type for comparison ... widened to unbounded").
    pub fn widened(&self) -> ColumnType {
        ColumnType {
            n_min: 0,
            n_max: UNBOUNDED,
            ..self.clone()
        }
    }

    /// The same type with the bounds `add`/`remove` use while parsing the
    /// operand (spec.md §4.F: `add` parses against `n_min=1, n_max=∞`).
    pub fn with_bounds(&self, n_min: usize, n_max: usize) -> ColumnType {
        ColumnType {
            n_min,
            n_max,
            ..self.clone()
        }
    }

    /// A set-of-keys variant of a map type, used by `remove`'s
    /// remove-by-key retry (spec.md §4.F).
    pub fn key_set(&self) -> ColumnType {
        ColumnType {
            key_type: self.key_type,
            value_type: None,
            n_min: 0,
            n_max: UNBOUNDED,
            key_ref_target: self.key_ref_target.clone(),
            value_ref_target: None,
        }
    }
}
