//! Unit tests for the username flag store

use std::time::{SystemTime, UNIX_EPOCH};
use stocksignal::services::LocalStore;
use tokio_test::assert_ok;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("stocksignal-{}-{}-{}", name, std::process::id(), nanos))
}

#[test]
fn test_memory_store_roundtrip() {
    let store = LocalStore::in_memory();
    assert_eq!(store.load_username(), None);
    assert_ok!(store.save_username("alice"));
    assert_eq!(store.load_username().as_deref(), Some("alice"));
    assert_ok!(store.clear());
    assert_eq!(store.load_username(), None);
}

#[test]
fn test_file_store_creates_directory_and_clears() {
    let dir = scratch_dir("file");
    let store = LocalStore::in_dir(&dir);
    assert_eq!(store.load_username(), None);

    store.save_username("bob").unwrap();
    assert!(dir.join("username").exists());
    assert_eq!(LocalStore::in_dir(&dir).load_username().as_deref(), Some("bob"));

    store.clear().unwrap();
    assert_eq!(store.load_username(), None);
    // Clearing twice is fine.
    assert_ok!(store.clear());

    let _ = std::fs::remove_dir_all(&dir);
}
