//! The demo `Bridge`/`Port` schema spec.md §8's end-to-end scenarios are
//! written against: `Bridge{name:string, ports:set<uuid→Port>}` (root),
//! `Port{name:string, tag:int, external_ids:map<string,string>}`.

use rowctl_core::{CmdShowTable, CtlTableClass, RowIdDescriptor};
use rowctl_datum::{AtomicType, ColumnType, UNBOUNDED};
use rowctl_idl::{Column, TableClass};

pub fn tables() -> Vec<CtlTableClass> {
    vec![
        CtlTableClass::new(
            TableClass::new(
                "Bridge",
                vec![
                    Column::new("name", ColumnType::scalar(AtomicType::String)),
                    Column::new(
                        "ports",
                        ColumnType::set(AtomicType::Uuid, 0, UNBOUNDED).with_key_ref("Port"),
                    ),
                ],
                true,
            ),
            vec![RowIdDescriptor::named("Bridge", "name")],
        ),
        CtlTableClass::new(
            TableClass::new(
                "Port",
                vec![
                    Column::new("name", ColumnType::scalar(AtomicType::String)),
                    Column::new("tag", ColumnType::optional_scalar(AtomicType::Integer)),
                    Column::new(
                        "external_ids",
                        ColumnType::map(AtomicType::String, AtomicType::String, 0, UNBOUNDED),
                    ),
                ],
                false,
            ),
            vec![RowIdDescriptor::named("Port", "name")],
        ),
    ]
}

pub fn cmd_show_tables() -> Vec<CmdShowTable> {
    vec![
        CmdShowTable::new("Bridge")
            .with_name_column("name")
            .with_columns(["ports"]),
        CmdShowTable::new("Port")
            .with_name_column("name")
            .with_columns(["tag", "external_ids"]),
    ]
}
