use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};

use sales_ingest::ledger::FileLedger;

fn tmp_ledger_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sales-ingest-{tag}-{nanos}.ndjson"))
}

#[test]
fn initialize_is_idempotent() {
    let path = tmp_ledger_path("ledger-init");
    let ledger = FileLedger::new(&path);

    ledger.initialize().unwrap();
    assert!(path.exists());
    assert!(ledger.entries().unwrap().is_empty());

    // Second call is a no-op.
    ledger.initialize().unwrap();
    assert!(ledger.entries().unwrap().is_empty());

    let _ = fs::remove_file(&path);
}

#[test]
fn initialize_creates_missing_parent_directories() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("sales-ingest-ledger-nested-{nanos}"));
    let path = dir.join("state").join("historico.ndjson");

    let ledger = FileLedger::new(&path);
    ledger.initialize().unwrap();
    assert!(path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn record_then_snapshot_round_trips() {
    let path = tmp_ledger_path("ledger-record");
    let ledger = FileLedger::new(&path);
    ledger.initialize().unwrap();

    let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
    ledger.record("vendas_01.csv", t1).unwrap();
    ledger.record("vendas_02.json", t2).unwrap();

    let known = ledger.known_filenames().unwrap();
    assert_eq!(known.len(), 2);
    assert!(known.contains("vendas_01.csv"));
    assert!(known.contains("vendas_02.json"));

    let entries = ledger.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].filename, "vendas_01.csv");
    assert_eq!(entries[0].processed_at, t1);
    assert_eq!(entries[1].filename, "vendas_02.json");

    let _ = fs::remove_file(&path);
}

#[test]
fn entries_survive_across_handles() {
    let path = tmp_ledger_path("ledger-durable");
    {
        let ledger = FileLedger::new(&path);
        ledger.initialize().unwrap();
        ledger.record("vendas_01.csv", Utc::now()).unwrap();
    }

    let reopened = FileLedger::new(&path);
    assert!(reopened.known_filenames().unwrap().contains("vendas_01.csv"));

    let _ = fs::remove_file(&path);
}

#[test]
fn missing_ledger_file_reads_as_empty() {
    let path = tmp_ledger_path("ledger-missing");
    let ledger = FileLedger::new(&path);

    assert!(ledger.entries().unwrap().is_empty());
    assert!(ledger.known_filenames().unwrap().is_empty());
}

#[test]
fn on_disk_entries_use_storage_column_names() {
    let path = tmp_ledger_path("ledger-names");
    let ledger = FileLedger::new(&path);
    ledger.initialize().unwrap();
    ledger.record("vendas_01.csv", Utc::now()).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"nome_arquivo\":\"vendas_01.csv\""));
    assert!(raw.contains("\"horario_processamento\""));

    let _ = fs::remove_file(&path);
}

#[test]
fn corrupt_entries_are_a_ledger_error() {
    let path = tmp_ledger_path("ledger-corrupt");
    fs::write(&path, "this is not json\n").unwrap();

    let ledger = FileLedger::new(&path);
    let err = ledger.entries().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ledger write failed"));
    assert!(msg.contains("corrupt entry at line 1"));

    let _ = fs::remove_file(&path);
}
