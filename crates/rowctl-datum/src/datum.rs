//! `Datum`: the in-memory representation of one column's value in one row.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::column_type::ColumnType;
use crate::error::DatumError;
use crate::lexer;

/// `{ n, keys[n]: Atom, values[n]?: Atom }` from spec.md §3. `values` is
/// `None` for scalars and sets; `Some` (same length as `keys`) for maps.
/// Always maintained sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Datum {
    keys: Vec<Atom>,
    values: Option<Vec<Atom>>,
}

impl Datum {
    pub fn empty() -> Self {
        Datum {
            keys: Vec::new(),
            values: None,
        }
    }

    pub fn scalar(atom: Atom) -> Self {
        Datum {
            keys: vec![atom],
            values: None,
        }
    }

    /// Build a set datum, sorting and de-duplicating keys.
    pub fn set(mut atoms: Vec<Atom>) -> Self {
        atoms.sort();
        atoms.dedup();
        Datum {
            keys: atoms,
            values: None,
        }
    }

    /// Build a map datum from `(key, value)` pairs, sorted by key.
    /// Errors if the same key appears twice.
    pub fn map(mut pairs: Vec<(Atom, Atom)>) -> Result<Self, DatumError> {
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        for w in pairs.windows(2) {
            if w[0].0 == w[1].0 {
                return Err(DatumError::DuplicateKey(w[0].0.to_string()));
            }
        }
        let (keys, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Ok(Datum {
            keys,
            values: Some(values),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_map(&self) -> bool {
        self.values.is_some()
    }

    pub fn keys(&self) -> &[Atom] {
        &self.keys
    }

    pub fn values(&self) -> Option<&[Atom]> {
        self.values.as_deref()
    }

    /// Extract the single value at `key`, per spec.md §4.E's key-qualified
    /// evaluation: an empty datum if the key is absent.
    pub fn value_at_key(&self, key: &Atom) -> Datum {
        match &self.values {
            Some(values) => match self.keys.binary_search(key) {
                Ok(idx) => Datum::scalar(values[idx].clone()),
                Err(_) => Datum::empty(),
            },
            None => Datum::empty(),
        }
    }

    /// Whether `self` is the column's default value. Every column defaults
    /// to the empty datum (spec.md §4.H prints a column only when it
    /// "differs from the column's default").
    pub fn is_default(&self) -> bool {
        self.is_empty()
    }

    pub fn check_cardinality(&self, ty: &ColumnType) -> Result<(), DatumError> {
        let n = self.len();
        if n < ty.n_min || n > ty.n_max {
            return Err(DatumError::Syntax(format!(
                "{n} values but column requires between {} and {}",
                ty.n_min,
                if ty.n_max == crate::column_type::UNBOUNDED {
                    "unlimited".to_string()
                } else {
                    ty.n_max.to_string()
                }
            )));
        }
        Ok(())
    }

    /// Lexicographic three-way comparison: by length first (shorter is
    /// smaller), then element-wise over the sorted keys, then — for maps —
    /// element-wise over the paired values.
    pub fn compare_3way(&self, other: &Datum) -> Ordering {
        match self.keys.len().cmp(&other.keys.len()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.keys.cmp(&other.keys) {
            Ordering::Equal => {}
            ord => return ord,
        }
        self.values.cmp(&other.values)
    }

    /// Set equality: same keys (and, for maps, same paired values)
    /// irrespective of insertion order — trivial here since both sides are
    /// kept sorted.
    pub fn set_eq(&self, other: &Datum) -> bool {
        self == other
    }

    /// `self ⊆ other`: every (key[, value]) pair of `self` appears in
    /// `other`.
    pub fn is_subset(&self, other: &Datum) -> bool {
        match (&self.values, &other.values) {
            (None, None) => self.keys.iter().all(|k| other.keys.binary_search(k).is_ok()),
            (Some(sv), Some(ov)) => self.keys.iter().zip(sv).all(|(k, v)| {
                other
                    .keys
                    .binary_search(k)
                    .map(|idx| &ov[idx] == v)
                    .unwrap_or(false)
            }),
            _ => false,
        }
    }

    /// `self ⊃ other` strictly: `other ⊆ self` and `self != other`.
    pub fn strict_superset(&self, other: &Datum) -> bool {
        other.is_subset(self) && self != other
    }

    /// Union two datums of the same structural shape, keeping `other`'s
    /// values for keys present in both (used by `set`'s key-form overlay
    /// and by `add`).
    pub fn union(&self, other: &Datum) -> Datum {
        match (&self.values, &other.values) {
            (None, None) => Datum::set(
                self.keys
                    .iter()
                    .cloned()
                    .chain(other.keys.iter().cloned())
                    .collect(),
            ),
            (Some(sv), Some(ov)) => {
                let mut pairs: Vec<(Atom, Atom)> = self
                    .keys
                    .iter()
                    .cloned()
                    .zip(sv.iter().cloned())
                    .collect();
                for (k, v) in other.keys.iter().cloned().zip(ov.iter().cloned()) {
                    if let Some(slot) = pairs.iter_mut().find(|(ek, _)| *ek == k) {
                        slot.1 = v;
                    } else {
                        pairs.push((k, v));
                    }
                }
                Datum::map(pairs).expect("keys de-duplicated above")
            }
            _ => self.clone(),
        }
    }

    /// Subtract `other` from `self`: drop every key (map) or element (set)
    /// that appears in `other`.
    pub fn subtract(&self, other: &Datum) -> Datum {
        match &self.values {
            None => Datum::set(
                self.keys
                    .iter()
                    .filter(|k| other.keys.binary_search(k).is_err())
                    .cloned()
                    .collect(),
            ),
            Some(sv) => {
                let pairs: Vec<(Atom, Atom)> = self
                    .keys
                    .iter()
                    .cloned()
                    .zip(sv.iter().cloned())
                    .filter(|(k, _)| other.keys.binary_search(k).is_err())
                    .collect();
                Datum::map(pairs).expect("subset of an already-valid map")
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match &self.values {
            None => serde_json::Value::Array(self.keys.iter().map(Atom::to_json).collect()),
            Some(values) => {
                let mut map = serde_json::Map::new();
                for (k, v) in self.keys.iter().zip(values) {
                    map.insert(k.to_string(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }

    /// Parse a literal against a column's structural type. Accepts a bare
    /// scalar token for `n_max == 1`; otherwise a comma-separated list,
    /// optionally wrapped in `[...]` (set) or `{...}` (map), of either bare
    /// atoms (set) or `KEY=VALUE` pairs (map).
    pub fn parse(input: &str, ty: &ColumnType) -> Result<Datum, DatumError> {
        let trimmed = input.trim();
        if ty.is_scalar() {
            return Ok(Datum::scalar(Atom::parse(trimmed, ty.key_type)?));
        }

        let inner = strip_brackets(trimmed);
        if inner.trim().is_empty() {
            return Ok(Datum::empty());
        }

        if ty.is_map() {
            let value_type = ty.value_type.expect("is_map");
            let mut pairs = Vec::new();
            for part in lexer::split_top_level(inner, ',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let eq = find_top_level_eq(part)
                    .ok_or_else(|| DatumError::Syntax(format!("expected KEY=VALUE, got \"{part}\"")))?;
                let key = Atom::parse(part[..eq].trim(), ty.key_type)?;
                let value = Atom::parse(part[eq + 1..].trim(), value_type)?;
                pairs.push((key, value));
            }
            Datum::map(pairs)
        } else {
            let mut atoms = Vec::new();
            for part in lexer::split_top_level(inner, ',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                atoms.push(Atom::parse(part, ty.key_type)?);
            }
            Ok(Datum::set(atoms))
        }
    }

    /// Parse a literal as a set-of-keys (used by `remove`'s map-by-key
    /// retry), ignoring `ty.value_type`.
    pub fn parse_key_set(input: &str, ty: &ColumnType) -> Result<Datum, DatumError> {
        Datum::parse(input, &ty.key_set())
    }
}

fn strip_brackets(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('[') && s.ends_with(']')) || (s.starts_with('{') && s.ends_with('}')) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn find_top_level_eq(s: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '=' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomicType;

    fn string_set_ty() -> ColumnType {
        ColumnType::set(AtomicType::String, 0, crate::column_type::UNBOUNDED)
    }

    fn string_map_ty() -> ColumnType {
        ColumnType::map(
            AtomicType::String,
            AtomicType::String,
            0,
            crate::column_type::UNBOUNDED,
        )
    }

    #[test]
    fn scalar_round_trips() {
        let ty = ColumnType::scalar(AtomicType::Integer);
        let d = Datum::parse("10", &ty).unwrap();
        assert_eq!(d, Datum::scalar(Atom::Integer(10)));
    }

    #[test]
    fn set_parses_and_sorts() {
        let d = Datum::parse("b,a,a,c", &string_set_ty()).unwrap();
        assert_eq!(
            d.keys(),
            &[
                Atom::String("a".into()),
                Atom::String("b".into()),
                Atom::String("c".into())
            ]
        );
    }

    #[test]
    fn map_parses_key_value_pairs() {
        let d = Datum::parse("color=red,size=big", &string_map_ty()).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(
            d.value_at_key(&Atom::String("color".into())),
            Datum::scalar(Atom::String("red".into()))
        );
    }

    #[test]
    fn map_rejects_duplicate_keys() {
        let err = Datum::parse("color=red,color=blue", &string_map_ty()).unwrap_err();
        assert!(matches!(err, DatumError::DuplicateKey(_)));
    }

    #[test]
    fn missing_key_yields_empty_datum() {
        let d = Datum::parse("color=red", &string_map_ty()).unwrap();
        assert_eq!(d.value_at_key(&Atom::String("size".into())), Datum::empty());
    }

    #[test]
    fn union_and_subtract_are_dual_for_fresh_sets() {
        let base = Datum::set(vec![Atom::String("a".into())]);
        let v = Datum::set(vec![Atom::String("b".into())]);
        let added = base.union(&v);
        let back = added.subtract(&v);
        assert_eq!(back, base);
    }

    #[test]
    fn subset_and_superset_operators() {
        let a = Datum::set(vec![Atom::Integer(1)]);
        let b = Datum::set(vec![Atom::Integer(1), Atom::Integer(2)]);
        assert!(a.is_subset(&b));
        assert!(b.strict_superset(&a));
        assert!(!a.strict_superset(&b));
    }

    #[test]
    fn set_of_keys_round_trip_on_map() {
        let ty = string_map_ty();
        let removed = Datum::parse_key_set("color", &ty).unwrap();
        assert_eq!(removed.keys(), &[Atom::String("color".into())]);
        assert!(!removed.is_map());
    }

    #[test]
    fn bracketed_literal_syntax_accepted() {
        let d = Datum::parse("[a,b]", &string_set_ty()).unwrap();
        assert_eq!(d.len(), 2);
    }
}
