//! The schema descriptors the IDL tracks, declared once by the embedder
//! and never mutated for the process lifetime (spec.md §3).

use rowctl_datum::ColumnType;

/// One column of a [`TableClass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    /// Schema-read-only columns reject `set`/`add`/`remove`/`clear`
    /// (spec.md §4.F, §6 `is_mutable`).
    pub mutable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Column {
            name: name.into(),
            ty,
            mutable: true,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.mutable = false;
        self
    }
}

/// `{ name, columns[], is_root }` from spec.md §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableClass {
    pub name: String,
    pub columns: Vec<Column>,
    /// Root tables' rows persist even when unreferenced; non-root rows are
    /// garbage-collected by the IDL when no strong reference remains
    /// (spec.md GLOSSARY). `create` warns when creating a non-root row with
    /// no `--id` binding it to a symbol (spec.md §4.F).
    pub is_root: bool,
}

impl TableClass {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, is_root: bool) -> Self {
        TableClass {
            name: name.into(),
            columns,
            is_root,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
