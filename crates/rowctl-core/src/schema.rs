//! Interpreter-level schema descriptors layered on top of `rowctl_idl`'s
//! `TableClass` (spec.md §3).

use rowctl_idl::TableClass;

/// `{ table, name_column?, uuid_column? }` from spec.md §3/§4.C. Allows a
/// user to name a row of `table`'s target via a string column on a
/// possibly-different "referrer" table (the GLOSSARY's "row-id path").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdDescriptor {
    /// The referrer table holding the identifying name column (or, if
    /// `uuid_column` is absent, the target table itself).
    pub table: String,
    /// Column on `table` holding the user-visible name. `None` means the
    /// identifying token must be the literal `"."` and `table` must have
    /// exactly one row.
    pub name_column: Option<String>,
    /// Column on `table` holding the UUID of the actual target row. `None`
    /// means the referrer *is* the target.
    pub uuid_column: Option<String>,
}

impl RowIdDescriptor {
    pub fn singleton(table: impl Into<String>) -> Self {
        RowIdDescriptor {
            table: table.into(),
            name_column: None,
            uuid_column: None,
        }
    }

    pub fn named(table: impl Into<String>, name_column: impl Into<String>) -> Self {
        RowIdDescriptor {
            table: table.into(),
            name_column: Some(name_column.into()),
            uuid_column: None,
        }
    }

    pub fn indirect(
        table: impl Into<String>,
        name_column: impl Into<String>,
        uuid_column: impl Into<String>,
    ) -> Self {
        RowIdDescriptor {
            table: table.into(),
            name_column: Some(name_column.into()),
            uuid_column: Some(uuid_column.into()),
        }
    }
}

/// `{ class: TableClass, row_ids: [RowIdDescriptor; K] }` from spec.md §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtlTableClass {
    pub class: TableClass,
    pub row_ids: Vec<RowIdDescriptor>,
}

impl CtlTableClass {
    pub fn new(class: TableClass, row_ids: Vec<RowIdDescriptor>) -> Self {
        CtlTableClass { class, row_ids }
    }

    pub fn name(&self) -> &str {
        &self.class.name
    }
}

/// The target of a weak back-reference scan in `show` (spec.md §3/§4.H).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrefTable {
    pub table: String,
    pub name_column: String,
    pub wref_column: String,
}

/// `{ table, name_column?, columns[: M], wref_table? }` from spec.md §3.
/// The first entry in `Interpreter::cmd_show_tables` defines `show`'s root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdShowTable {
    pub table: String,
    pub name_column: Option<String>,
    pub columns: Vec<String>,
    pub wref_table: Option<WrefTable>,
}

impl CmdShowTable {
    pub fn new(table: impl Into<String>) -> Self {
        CmdShowTable {
            table: table.into(),
            name_column: None,
            columns: Vec::new(),
            wref_table: None,
        }
    }

    pub fn with_name_column(mut self, col: impl Into<String>) -> Self {
        self.name_column = Some(col.into());
        self
    }

    pub fn with_columns(mut self, cols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_wref(
        mut self,
        table: impl Into<String>,
        name_column: impl Into<String>,
        wref_column: impl Into<String>,
    ) -> Self {
        self.wref_table = Some(WrefTable {
            table: table.into(),
            name_column: name_column.into(),
            wref_column: wref_column.into(),
        });
        self
    }
}
