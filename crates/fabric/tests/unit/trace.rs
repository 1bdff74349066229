//! Transaction log tests.

use std::fs;

use busfab_core::common::{SimTime, Transaction};
use busfab_core::trace::{HEADER, LogRecord, TransactionLog};
use pretty_assertions::assert_eq;

fn record_for(txn: &Transaction, time: SimTime) -> LogRecord<'_> {
    LogRecord {
        time,
        target: 0,
        initiator: 2,
        address: txn.address,
        txn,
    }
}

#[test]
fn in_memory_log_starts_with_header() {
    let (mut log, buffer) = TransactionLog::in_memory();
    let txn = Transaction::read(0x40, 4);
    log.record(&record_for(&txn, SimTime::ps(1500))).unwrap();

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines[1], "1500 ps,2,0,0x40,read,0x0,4,4,0x0,00000000");
    assert_eq!(log.records(), 1);
}

#[test]
fn file_log_rotates_and_keeps_bounded_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fabric.csv");
    let mut log = TransactionLog::create(&path, 200, 3).unwrap();

    let txn = Transaction::write(0x0, vec![1, 2, 3, 4]);
    for i in 0..10 {
        log.record(&record_for(&txn, SimTime::ns(i))).unwrap();
    }
    log.flush().unwrap();
    drop(log);

    let rotated = |n: usize| dir.path().join(format!("fabric.csv.{n}"));
    assert!(path.exists());
    assert!(rotated(1).exists());
    assert!(rotated(2).exists());
    assert!(!rotated(3).exists());

    for file in [path.clone(), rotated(1), rotated(2)] {
        let text = fs::read_to_string(&file).unwrap();
        assert_eq!(text.lines().next(), Some(HEADER));
        assert!(text.len() <= 200, "{} holds {} bytes", file.display(), text.len());
    }

    let newest = fs::read_to_string(&path).unwrap();
    assert!(newest.lines().last().unwrap().starts_with("9 ns,"));
}

#[test]
fn single_file_log_truncates_on_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fabric.csv");
    let mut log = TransactionLog::create(&path, 150, 1).unwrap();

    let txn = Transaction::write(0x0, vec![1, 2, 3, 4]);
    for i in 0..5 {
        log.record(&record_for(&txn, SimTime::ns(i))).unwrap();
    }
    drop(log);

    assert!(!dir.path().join("fabric.csv.1").exists());
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some(HEADER));
    assert!(text.lines().last().unwrap().starts_with("4 ns,"));
}

#[test]
fn unwritable_path_is_an_io_error() {
    let err = TransactionLog::create("/nonexistent/dir/fabric.csv", 1024, 2).unwrap_err();
    assert!(matches!(err, busfab_core::FabricError::Io { .. }));
}
