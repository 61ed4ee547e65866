//! Unit tests for the record-store crate.

use seed_core::Record;
use serde_json::json;
use tempfile::TempDir;

use crate::{JsonFileStore, MemoryStore, StorageBackend, StoreError};

fn sample_records() -> Vec<Record> {
    vec![
        Record::from_value(json!({"name": "Acme", "email": "hello@acme.io"})).unwrap(),
        Record::from_value(json!({"name": "Globex", "email": "info@globex.io"})).unwrap(),
    ]
}

// ============================================================================
// JsonFileStore Tests
// ============================================================================

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("companies.json"));

    let records = store.load().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_flush_then_load_preserves_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("companies.json");
    let store = JsonFileStore::new(&path);

    store.flush(&sample_records()).await.unwrap();
    assert!(path.exists());
    assert!(!dir.path().join("nested").join("companies.json.tmp").exists());

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, sample_records());
}

#[tokio::test]
async fn test_flush_rewrites_whole_file() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("companies.json"));

    store.flush(&sample_records()).await.unwrap();
    store.flush(&sample_records()[..1]).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].text("name").as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_file_is_a_plain_json_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("companies.json");
    let store = JsonFileStore::new(&path);

    store.flush(&sample_records()).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[1]["name"], "Globex");
}

#[tokio::test]
async fn test_single_object_file_loads_as_one_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("company.json");
    std::fs::write(&path, r#"{"name": "Solo"}"#).unwrap();

    let loaded = JsonFileStore::new(&path).load().await.unwrap();
    assert_eq!(loaded.len(), 1);
}

#[tokio::test]
async fn test_non_object_entries_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.json");
    std::fs::write(&path, r#"[{"name": "Kept"}, "stray", 42]"#).unwrap();

    let loaded = JsonFileStore::new(&path).load().await.unwrap();
    assert_eq!(loaded.len(), 1);
}

#[tokio::test]
async fn test_empty_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "  \n").unwrap();

    assert!(JsonFileStore::new(&path).load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"name\": ").unwrap();

    let result = JsonFileStore::new(&path).load().await;
    assert!(matches!(result, Err(StoreError::Json { .. })));
}

#[tokio::test]
async fn test_scalar_file_is_unexpected_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scalar.json");
    std::fs::write(&path, "42").unwrap();

    let result = JsonFileStore::new(&path).load().await;
    assert!(matches!(result, Err(StoreError::UnexpectedShape(_))));
}

// ============================================================================
// MemoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_counts_flushes() {
    let store = MemoryStore::with_records(sample_records());
    assert_eq!(store.load().await.unwrap().len(), 2);

    store.flush(&sample_records()[..1]).await.unwrap();
    assert_eq!(store.flush_count(), 1);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_memory_store_can_fail_flushes() {
    let store = MemoryStore::new();
    store.fail_flushes(true);

    let result = store.flush(&sample_records()).await;
    assert!(matches!(result, Err(StoreError::Backend(_))));
    assert_eq!(store.flush_count(), 0);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_memory_store_fails_only_the_next_flushes() {
    let store = MemoryStore::new();
    store.fail_next_flushes(1);

    assert!(store.flush(&sample_records()).await.is_err());
    assert!(store.records().is_empty());

    store.flush(&sample_records()).await.unwrap();
    assert_eq!(store.flush_count(), 1);
    assert_eq!(store.records().len(), 2);
}
