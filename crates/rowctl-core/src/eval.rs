//! The twelve relational/set-relational operators over parsed datums
//! (spec.md §4.E), dispatched from a single `Op` enum — the "single
//! dispatch point" spec.md §9 calls for.

use std::cmp::Ordering;

use rowctl_datum::{Atom, ColumnType, Datum};

use crate::error::CtlError;

/// The twelve operators of spec.md §4.E, in the textual order the argument
/// parser's `allowed_ops` slices present them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    SetEq,
    SetNe,
    SetLt,
    SetGt,
    SetLe,
    SetGe,
}

impl Op {
    /// The textual operators in longest-match-first order, paired with
    /// their `Op` — exactly the `allowed_ops` slice a condition argument is
    /// parsed against (component B).
    pub const ALL: &'static [(&'static str, Op)] = &[
        ("{<=}", Op::SetLe),
        ("{>=}", Op::SetGe),
        ("{!=}", Op::SetNe),
        ("{=}", Op::SetEq),
        ("{<}", Op::SetLt),
        ("{>}", Op::SetGt),
        ("<=", Op::Le),
        (">=", Op::Ge),
        ("!=", Op::Ne),
        ("=", Op::Eq),
        ("<", Op::Lt),
        (">", Op::Gt),
    ];

    pub fn tokens() -> Vec<&'static str> {
        Self::ALL.iter().map(|(t, _)| *t).collect()
    }

    pub fn from_index(allowed: &[&str], index: usize) -> Option<Op> {
        let token = allowed.get(index)?;
        Self::ALL.iter().find(|(t, _)| t == token).map(|(_, op)| *op)
    }

    pub fn is_set_op(self) -> bool {
        matches!(
            self,
            Op::SetEq | Op::SetNe | Op::SetLt | Op::SetGt | Op::SetLe | Op::SetGe
        )
    }
}

/// Evaluate `row_value OP literal` for a (possibly key-qualified) condition.
///
/// `row_value` is the full column datum read from the row; `key` is
/// `Some` for `COLUMN:KEY OP VALUE` conditions, in which case only the
/// value at that key participates (spec.md §4.E). For non-set operators,
/// a missing key short-circuits to `false`; for set operators the (empty)
/// extracted datum is compared as-is.
pub fn eval(op: Op, row_value: &Datum, key: Option<&Atom>, literal: &Datum) -> bool {
    let lhs = match key {
        Some(k) => row_value.value_at_key(k),
        None => row_value.clone(),
    };
    if key.is_some() && !op.is_set_op() && lhs.is_empty() {
        return false;
    }

    match op {
        Op::Eq => lhs.compare_3way(literal) == Ordering::Equal,
        Op::Ne => lhs.compare_3way(literal) != Ordering::Equal,
        Op::Lt => lhs.compare_3way(literal) == Ordering::Less,
        Op::Gt => lhs.compare_3way(literal) == Ordering::Greater,
        Op::Le => lhs.compare_3way(literal) != Ordering::Greater,
        Op::Ge => lhs.compare_3way(literal) != Ordering::Less,
        Op::SetEq => lhs.set_eq(literal),
        Op::SetNe => !lhs.set_eq(literal),
        Op::SetLt => literal.strict_superset(&lhs),
        Op::SetGt => lhs.strict_superset(literal),
        Op::SetLe => lhs.is_subset(literal),
        Op::SetGe => literal.is_subset(&lhs),
    }
}

/// Parse a condition's literal against the column's widened type
/// (spec.md §4.E: "column type for comparison ... widened to unbounded").
pub fn parse_literal(input: &str, ty: &ColumnType) -> Result<Datum, CtlError> {
    Ok(Datum::parse(input, &ty.widened())?)
}

/// The type a condition's literal is parsed against: for a key-qualified
/// condition (`COLUMN:KEY OP VALUE`) the extracted datum is the single
/// value at that key, so the literal must be parsed as a scalar of the
/// column's *value* type, not the column's own (map) type — otherwise
/// `Datum::parse` takes the map branch and rejects a bare `VALUE` for
/// wanting `KEY=VALUE` (spec.md §4.E).
pub fn literal_type(column_ty: &ColumnType, keyed: bool) -> ColumnType {
    if keyed {
        let value_type = column_ty
            .value_type
            .expect("a key-qualified condition only parses against a map column");
        ColumnType::scalar(value_type)
    } else {
        column_ty.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowctl_datum::AtomicType;

    #[test]
    fn scalar_equality() {
        let row = Datum::scalar(Atom::Integer(10));
        let lit = Datum::scalar(Atom::Integer(10));
        assert!(eval(Op::Eq, &row, None, &lit));
        assert!(!eval(Op::Ne, &row, None, &lit));
    }

    #[test]
    fn scalar_ordering() {
        let row = Datum::scalar(Atom::Integer(5));
        let lit = Datum::scalar(Atom::Integer(10));
        assert!(eval(Op::Lt, &row, None, &lit));
        assert!(eval(Op::Le, &row, None, &lit));
        assert!(!eval(Op::Gt, &row, None, &lit));
    }

    #[test]
    fn key_qualified_eq_on_map() {
        let row = Datum::map(vec![
            (Atom::String("color".into()), Atom::String("red".into())),
        ])
        .unwrap();
        let lit = Datum::scalar(Atom::String("red".into()));
        assert!(eval(Op::Eq, &row, Some(&Atom::String("color".into())), &lit));
        assert!(!eval(Op::Eq, &row, Some(&Atom::String("size".into())), &lit));
    }

    #[test]
    fn set_relational_operators() {
        let row = Datum::set(vec![Atom::Integer(1), Atom::Integer(2)]);
        let lit = Datum::set(vec![Atom::Integer(1)]);
        assert!(eval(Op::SetGt, &row, None, &lit));
        assert!(eval(Op::SetGe, &row, None, &lit));
        assert!(!eval(Op::SetLt, &row, None, &lit));
        assert!(eval(Op::SetLe, &lit, None, &row));
    }

    #[test]
    fn widened_type_allows_any_cardinality_literal() {
        let scalar_ty = ColumnType::scalar(AtomicType::Integer);
        let parsed = parse_literal("1,2,3", &scalar_ty);
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().len(), 3);
    }
}
