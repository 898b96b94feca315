//! Symbol table for forward-referenced row identities (`@name`),
//! spec.md §4.D.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::CtlError;

/// `{ uuid, created: bool, strong_ref: bool }`, keyed by a user name that
/// must begin with `@`. Lifetime = one transaction attempt (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub uuid: Uuid,
    pub created: bool,
    pub strong_ref: bool,
}

/// Attempt-scoped: a fresh, empty table is built for every transaction
/// attempt the execution driver opens (spec.md §5: discarded and rebuilt
/// on `try_again`).
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or fetch) the symbol named `id`. `id` must start with `@`.
    /// If the symbol already has `created == true`, this is a fatal
    /// redefinition (spec.md invariant 3) — the caller picks the verb-
    /// specific wording (`create` vs. `get --id` phrase this differently
    /// in spec.md §4.F even though the underlying rule is the same).
    /// Returns the symbol and whether it pre-existed before this call
    /// (`report_new` in spec.md §4.D).
    pub fn create_symbol(&mut self, id: &str, uuid: Uuid) -> Result<(Symbol, bool), CtlError> {
        if !id.starts_with('@') {
            return Err(CtlError::usage(format!(
                "symbol name \"{id}\" must begin with \"@\""
            )));
        }
        let pre_existed = self.symbols.contains_key(id);
        if matches!(self.symbols.get(id), Some(s) if s.created) {
            return Err(CtlError::resolution(format!(
                "symbol {id} is already used"
            )));
        }
        let entry = self.symbols.entry(id.to_string()).or_insert(Symbol {
            uuid,
            created: false,
            strong_ref: false,
        });
        entry.created = true;
        entry.uuid = uuid;
        Ok((self.symbols[id], pre_existed))
    }

    /// Look up a symbol without creating it. A `@sym` used in value
    /// position must already have been defined by an earlier `create --id`
    /// or `get --id` in program order — this never auto-vivifies.
    pub fn lookup(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Mark `id` as strongly referenced, suppressing "unreferenced symbol"
    /// diagnostics the embedding may emit (spec.md §4.D).
    pub fn mark_strong_ref(&mut self, id: &str) {
        if let Some(sym) = self.symbols.get_mut(id) {
            sym.strong_ref = true;
        }
    }

    pub fn uncreated_strong_refs(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .filter(|(_, s)| s.strong_ref && !s.created)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_names_without_sigil() {
        let mut t = SymbolTable::new();
        assert!(t.create_symbol("foo", Uuid::new_v4()).is_err());
    }

    #[test]
    fn second_creation_of_same_symbol_is_fatal() {
        let mut t = SymbolTable::new();
        t.create_symbol("@p", Uuid::new_v4()).unwrap();
        assert!(t.create_symbol("@p", Uuid::new_v4()).is_err());
    }

    #[test]
    fn report_new_reflects_pre_existence() {
        let mut t = SymbolTable::new();
        let (_, pre_existed) = t.create_symbol("@p", Uuid::new_v4()).unwrap();
        assert!(!pre_existed);
    }
}
