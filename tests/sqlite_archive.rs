use slelog::{
    persist::{LogSink, sqlite::SqliteArchive},
    pipeline::convert,
};
use tempfile::tempdir;

const FIRST: &str = "my_call W1AW
my_reference W1/AA-001
2024-06-01
14.300 ssb
K1ABC 59 59 1200z
K2XYZ
K3DEF 1210z s2s G/LD-001
";

const SECOND: &str = "my_call W1AW
my_reference W1/AA-002
2024-06-02
utc -4
7.032 cw
K2XYZ 599 579 800l
K4GHI 815l
";

#[test]
fn archive_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("activations.db");

    let first = convert(FIRST).expect("first");
    let second = convert(SECOND).expect("second");

    let (id1, id2) = {
        let mut archive = SqliteArchive::open(&db_path).expect("open");
        let id1 = archive.append_activation(&first, Some("first.sle")).expect("append");
        let id2 = archive.append_activation(&second, None).expect("append");
        archive.flush().expect("flush");
        (id1, id2)
    };

    let archive = SqliteArchive::open(&db_path).expect("reopen");
    assert_eq!(archive.activation_ids().expect("ids"), vec![id1, id2]);
    assert_eq!(archive.load_activation(id1).expect("load"), Some(first));
    assert_eq!(archive.load_activation(id2).expect("load"), Some(second));
    assert_eq!(archive.load_activation(id2 + 100).expect("load"), None);
}

#[test]
fn contacts_are_indexed_by_call() {
    let mut archive = SqliteArchive::open_in_memory().expect("open");
    let id1 = archive
        .append_activation(&convert(FIRST).expect("first"), None)
        .expect("append");
    let id2 = archive
        .append_activation(&convert(SECOND).expect("second"), None)
        .expect("append");

    let rows = archive.contacts_by_call("k2xyz").expect("query");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].activation_id, id1);
    assert_eq!(rows[0].my_reference, "W1/AA-001");
    assert_eq!(rows[0].date, "2024-06-01");
    assert_eq!(rows[0].zulu, "1205");
    assert!(rows[0].interpolated);

    assert_eq!(rows[1].activation_id, id2);
    assert_eq!(rows[1].zulu, "1200");
    assert!(!rows[1].interpolated);

    assert!(archive.contacts_by_call("N0NE").expect("query").is_empty());
}

#[test]
fn sink_writes_use_configured_source() {
    let mut archive = SqliteArchive::open_in_memory().expect("open");
    archive.set_source(Some("g-ld-001.sle".to_string()));
    archive.write_log(&convert(FIRST).expect("first")).expect("write");
    archive.write_log(&convert(SECOND).expect("second")).expect("write");
    assert_eq!(archive.activation_ids().expect("ids").len(), 2);
}
