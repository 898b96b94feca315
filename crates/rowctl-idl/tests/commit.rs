use rowctl_datum::{Atom, AtomicType, ColumnType, Datum};
use rowctl_idl::{Column, CommitOutcome, Idl, TableClass};

fn demo_idl() -> Idl {
    let mut idl = Idl::new();
    idl.add_table(TableClass::new(
        "Port",
        vec![
            Column::new("name", ColumnType::scalar(AtomicType::String)),
            Column::new("tag", ColumnType::optional_scalar(AtomicType::Integer)),
        ],
        false,
    ));
    idl.add_table(TableClass::new(
        "Bridge",
        vec![
            Column::new("name", ColumnType::scalar(AtomicType::String)),
            Column::new(
                "ports",
                ColumnType::set(AtomicType::Uuid, 0, rowctl_datum::UNBOUNDED).with_key_ref("Port"),
            ),
        ],
        true,
    ));
    idl.declare_column("Port", "name").unwrap();
    idl.declare_column("Port", "tag").unwrap();
    idl.declare_column("Bridge", "name").unwrap();
    idl.declare_column("Bridge", "ports").unwrap();
    idl
}

#[test]
fn insert_and_commit_remaps_provisional_uuid_in_same_attempt() {
    let mut idl = demo_idl();
    let mut txn = idl.open_txn();

    let port = idl.txn_insert(&mut txn, "Port", None).unwrap();
    idl.txn_write(
        &mut txn,
        &port,
        "name",
        Datum::scalar(Atom::String("eth0".into())),
    )
    .unwrap();

    let bridge = idl.txn_insert(&mut txn, "Bridge", None).unwrap();
    idl.txn_write(
        &mut txn,
        &bridge,
        "name",
        Datum::scalar(Atom::String("br0".into())),
    )
    .unwrap();
    idl.txn_write(
        &mut txn,
        &bridge,
        "ports",
        Datum::set(vec![Atom::Uuid(port.uuid)]),
    )
    .unwrap();

    let provisional_port = port.uuid;
    let outcome = idl.commit(&mut txn).unwrap();
    assert_eq!(outcome, CommitOutcome::Success);

    let committed_port = idl.txn_get_insert_uuid(&txn, provisional_port).unwrap();
    let committed_bridge_uuid = idl
        .rows(&idl.open_txn(), "Bridge")
        .next()
        .unwrap()
        .uuid;
    let bridge_row = idl
        .get_row_for_uuid(&idl.open_txn(), "Bridge", committed_bridge_uuid)
        .unwrap();
    let ports = idl.read(&idl.open_txn(), &bridge_row, "ports").unwrap();
    assert_eq!(ports, Datum::set(vec![Atom::Uuid(committed_port)]));
}

#[test]
fn verified_read_conflicts_with_concurrent_write() {
    let mut idl = demo_idl();

    let mut setup = idl.open_txn();
    let port = idl.txn_insert(&mut setup, "Port", None).unwrap();
    idl.txn_write(
        &mut setup,
        &port,
        "name",
        Datum::scalar(Atom::String("eth0".into())),
    )
    .unwrap();
    idl.txn_write(&mut setup, &port, "tag", Datum::scalar(Atom::Integer(5)))
        .unwrap();
    idl.commit(&mut setup).unwrap();
    let committed_uuid = idl.rows(&idl.open_txn(), "Port").next().unwrap().uuid;
    let row = idl
        .get_row_for_uuid(&idl.open_txn(), "Port", committed_uuid)
        .unwrap();

    let mut reader_txn = idl.open_txn();
    idl.txn_verify(&mut reader_txn, &row, "tag");

    let mut writer_txn = idl.open_txn();
    idl.txn_write(
        &mut writer_txn,
        &row,
        "tag",
        Datum::scalar(Atom::Integer(10)),
    )
    .unwrap();
    idl.commit(&mut writer_txn).unwrap();

    let outcome = idl.commit(&mut reader_txn).unwrap();
    assert_eq!(outcome, CommitOutcome::TryAgainRetry);
}

#[test]
fn read_enforces_pre_pass_declaration() {
    let mut idl = Idl::new();
    idl.add_table(TableClass::new(
        "Port",
        vec![Column::new("name", ColumnType::scalar(AtomicType::String))],
        false,
    ));
    // note: no declare_column call
    let mut txn = idl.open_txn();
    let row = idl.txn_insert(&mut txn, "Port", None).unwrap();
    assert!(idl.read(&txn, &row, "name").is_err());
}
