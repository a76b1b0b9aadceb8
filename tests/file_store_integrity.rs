//! File Store Integrity Tests
//!
//! - Every record is checksummed and corruption is never ignored
//! - Corruption is FATAL and reported with its byte offset
//! - Acknowledged documents survive a reopen
//! - Rejected documents never reach the record file

use std::fs::{self, OpenOptions};

use inspectdb::catalog::Catalog;
use inspectdb::model::{Address, Restaurant};
use inspectdb::schema::SchemaRegistry;
use inspectdb::store::{
    DocumentStore, FileStore, RecordReader, StoreErrorCode, RECORD_FILE,
};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn record_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("data").join(RECORD_FILE)
}

fn write_two_restaurants(temp_dir: &TempDir) {
    let store = FileStore::open(temp_dir.path()).unwrap();
    store
        .insert("restaurants", json!({"name": "First", "rating": 3}))
        .unwrap();
    store
        .insert("restaurants", json!({"name": "Second", "rating": 5}))
        .unwrap();
}

fn file_catalog(temp_dir: &TempDir) -> Catalog<FileStore> {
    Catalog::new(
        SchemaRegistry::with_builtins(),
        FileStore::open(temp_dir.path()).unwrap(),
    )
}

// =============================================================================
// Corruption Is Never Ignored
// =============================================================================

#[test]
fn test_flipped_byte_is_fatal_on_open() {
    let temp_dir = TempDir::new().unwrap();
    write_two_restaurants(&temp_dir);

    let path = record_path(&temp_dir);
    let mut bytes = fs::read(&path).unwrap();
    let middle = bytes.len() / 4;
    bytes[middle] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    let err = FileStore::open(temp_dir.path()).err().unwrap();
    assert_eq!(err.code(), StoreErrorCode::DataCorruption);
    assert!(err.is_fatal());
    assert!(err.to_string().starts_with("[FATAL] INSPECTDB_DATA_CORRUPTION"));
}

#[test]
fn test_truncated_tail_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    write_two_restaurants(&temp_dir);

    let path = record_path(&temp_dir);
    let len = fs::metadata(&path).unwrap().len();
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(len - 3).unwrap();
    drop(file);

    let err = FileStore::open(temp_dir.path()).err().unwrap();
    assert_eq!(err.code(), StoreErrorCode::DataCorruption);
    assert!(err.details().unwrap().starts_with("byte_offset: "));
}

#[test]
fn test_reader_stops_at_first_bad_record() {
    let temp_dir = TempDir::new().unwrap();
    write_two_restaurants(&temp_dir);

    let path = record_path(&temp_dir);
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, bytes).unwrap();

    let mut reader = RecordReader::open(&path).unwrap();
    let first = reader.read_next().unwrap().unwrap();
    assert_eq!(first.document().unwrap()["name"], "First");

    let err = reader.read_next().unwrap_err();
    assert!(err.is_fatal());
}

// =============================================================================
// Durability
// =============================================================================

#[test]
fn test_documents_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let id = {
        let catalog = file_catalog(&temp_dir);
        catalog
            .insert_restaurant(&Restaurant::new(
                "Golden Dragon",
                Address::new("1 High St", "York", "YO1 7HH"),
                5,
                "Chinese",
            ))
            .unwrap()
    };

    let catalog = file_catalog(&temp_dir);
    let found = catalog.runner().find_high_rated(4).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, Some(id));
    assert_eq!(found[0].name, "Golden Dragon");
}

#[test]
fn test_duplicate_id_rejected_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert("inspections", json!({"result": "Pass"})).unwrap()
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    let err = store
        .insert("inspections", json!({"_id": id.as_str(), "result": "Fail"}))
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::StoreInvalidDocument);
    assert_eq!(store.count("inspections").unwrap(), 1);
}

#[test]
fn test_rejected_documents_never_written() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = file_catalog(&temp_dir);
    let before = fs::metadata(record_path(&temp_dir)).unwrap().len();

    assert!(catalog
        .insert("restaurants", json!({"name": "Incomplete"}))
        .is_err());
    assert!(catalog
        .insert("inspections", json!({"result": "Closed"}))
        .is_err());

    assert_eq!(fs::metadata(record_path(&temp_dir)).unwrap().len(), before);
    assert!(catalog.store().scan("restaurants").unwrap().is_empty());
}

#[test]
fn test_collections_are_isolated_in_one_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path()).unwrap();
    store.insert("restaurants", json!({"name": "A"})).unwrap();
    store.insert("inspections", json!({"result": "Pass"})).unwrap();
    store.insert("restaurants", json!({"name": "B"})).unwrap();

    let names: Vec<String> = store
        .scan("restaurants")
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(store.scan("inspections").unwrap().len(), 1);
    assert!(store.scan("menus").unwrap().is_empty());
}
