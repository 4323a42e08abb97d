// Integration tests for veritas_core::persistence over both store backends.

use std::sync::Arc;

use tempfile::TempDir;

use veritas_core::{
    persistence::CaseStore,
    seed::seed_cases,
    store::{KvStore, MemoryStore, SqliteStore},
};

fn sqlite_store(dir: &TempDir) -> Arc<SqliteStore> {
    let path = dir.path().join("veritas.db");
    Arc::new(SqliteStore::open(path.to_str().unwrap()).unwrap())
}

#[test]
fn save_then_load_is_identity() {
    let store = CaseStore::new(Arc::new(MemoryStore::new()), "veritas_cases");
    let cases = seed_cases();
    store.save(&cases).unwrap();
    let loaded = store.load();
    assert_eq!(loaded, cases);

    // Re-serializing what was loaded reproduces the stored bytes.
    let first = store.raw().unwrap().unwrap();
    store.save(&loaded).unwrap();
    assert_eq!(store.raw().unwrap().unwrap(), first);
}

#[test]
fn sqlite_round_trip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut cases = seed_cases();
    cases[1].notes.clear();
    cases[2].title = "Litigation: TechFlow v. DataStream (closed)".into();

    CaseStore::new(sqlite_store(&dir), "veritas_cases").save(&cases).unwrap();
    let loaded = CaseStore::new(sqlite_store(&dir), "veritas_cases").load();
    assert_eq!(loaded, cases);
}

#[test]
fn loads_blob_written_by_browser_console() {
    // Integer amounts and a missing `financials` list, as older blobs have.
    let raw = r#"[{"id":"CS-2024-777","title":"Lease dispute","client":"Acme","status":"Active",
        "description":"","accessCode":"4321","documents":[{"id":"doc-1","title":"lease.txt",
        "type":"Text Document","content":"...","dateAdded":"3/1/2024"}],"people":[],"notes":[],
        "lastUpdated":"Just now","progress":5},
        {"id":"CS-2024-778","title":"Fees","client":"Acme","status":"Archived","description":"",
        "accessCode":"1234","documents":[],"people":[],"notes":[],"financials":[{"id":"fin-1",
        "date":"3/2/2024","description":"Retainer","amount":5000,"type":"Income",
        "category":"Flat Fee"}],"lastUpdated":"Oct 2023","progress":100}]"#;
    let mem = Arc::new(MemoryStore::new());
    mem.set("veritas_cases", raw).unwrap();

    let cases = CaseStore::new(mem, "veritas_cases").load();
    assert_eq!(cases.len(), 2);
    assert!(cases[0].financials.is_empty());
    assert_eq!(cases[0].documents[0].doc_type, "Text Document");
    assert_eq!(cases[1].financials[0].amount, 5000.0);
}

#[test]
fn keys_are_isolated() {
    let mem = Arc::new(MemoryStore::new());
    let a = CaseStore::new(mem.clone(), "profile_a");
    let b = CaseStore::new(mem, "profile_b");
    let mut cases = seed_cases();
    cases.truncate(1);
    a.save(&cases).unwrap();
    assert_eq!(a.load().len(), 1);
    assert_eq!(b.load().len(), 3);
}

#[test]
fn fractional_progress_keeps_stored_cases() {
    let raw = r#"[{"id":"CS-2024-777","title":"Lease dispute","client":"Acme","status":"Active",
        "description":"","accessCode":"4321","documents":[],"people":[],"notes":[],
        "lastUpdated":"Just now","progress":62.5}]"#;
    let mem = Arc::new(MemoryStore::new());
    mem.set("veritas_cases", raw).unwrap();

    let cases = CaseStore::new(mem, "veritas_cases").load();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].id, "CS-2024-777");
    assert_eq!(cases[0].progress, 63);
}
