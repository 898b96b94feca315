//! Scalar atoms — the leaves of a [`crate::Datum`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatumError;
use crate::lexer;

/// The atomic type tag a column's key or value slot is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicType {
    String,
    Integer,
    Boolean,
    Uuid,
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AtomicType::String => "string",
            AtomicType::Integer => "integer",
            AtomicType::Boolean => "boolean",
            AtomicType::Uuid => "uuid",
        };
        f.write_str(s)
    }
}

/// A single scalar value. Ordered so that sets and maps can be kept sorted
/// by key without a separate comparator per atomic type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Atom {
    String(String),
    Integer(i64),
    Boolean(bool),
    Uuid(Uuid),
}

impl Atom {
    pub fn atomic_type(&self) -> AtomicType {
        match self {
            Atom::String(_) => AtomicType::String,
            Atom::Integer(_) => AtomicType::Integer,
            Atom::Boolean(_) => AtomicType::Boolean,
            Atom::Uuid(_) => AtomicType::Uuid,
        }
    }

    /// Parse a single token (already isolated by the caller, e.g. via
    /// [`lexer::split_top_level`]) as an atom of the given type.
    pub fn parse(token: &str, ty: AtomicType) -> Result<Atom, DatumError> {
        let token = token.trim();
        match ty {
            AtomicType::String => {
                if token.starts_with('"') {
                    let (s, rest) = lexer::scan_token(token)?;
                    if !rest.trim().is_empty() {
                        return Err(DatumError::Syntax(format!(
                            "trailing garbage after quoted string: {rest}"
                        )));
                    }
                    Ok(Atom::String(s))
                } else {
                    Ok(Atom::String(token.to_string()))
                }
            }
            AtomicType::Integer => token
                .parse::<i64>()
                .map(Atom::Integer)
                .map_err(|_| DatumError::BadAtom {
                    value: token.to_string(),
                    expected: "integer",
                }),
            AtomicType::Boolean => match token {
                "true" | "1" => Ok(Atom::Boolean(true)),
                "false" | "0" => Ok(Atom::Boolean(false)),
                _ => Err(DatumError::BadAtom {
                    value: token.to_string(),
                    expected: "boolean",
                }),
            },
            AtomicType::Uuid => token
                .parse::<Uuid>()
                .map(Atom::Uuid)
                .map_err(|_| DatumError::BadAtom {
                    value: token.to_string(),
                    expected: "uuid",
                }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Atom::String(s) => serde_json::Value::String(s.clone()),
            Atom::Integer(i) => serde_json::Value::from(*i),
            Atom::Boolean(b) => serde_json::Value::Bool(*b),
            Atom::Uuid(u) => serde_json::Value::String(u.to_string()),
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Atom::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Atom::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::String(s) => write!(f, "{s}"),
            Atom::Integer(i) => write!(f, "{i}"),
            Atom::Boolean(b) => write!(f, "{b}"),
            Atom::Uuid(u) => write!(f, "{u}"),
        }
    }
}
