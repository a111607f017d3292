use std::sync::Arc;

use datastore_prefs::storage::{MemoryStorage, Storage};
use datastore_prefs::{DataStore, LoadError, StoreError, StoreOptions, User};

#[derive(Debug)]
struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, std::io::Error> {
        Ok(None)
    }

    fn write(&self, _key: &str, _data: &str) -> Result<(), std::io::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ))
    }

    fn get_path(&self, key: &str) -> String {
        format!("readonly::{}", key)
    }
}

#[test]
fn test_instance_already_loaded_error() {
    let dir = tempfile::tempdir().unwrap();

    let first = DataStore::open_in(dir.path(), "prefs_user").expect("First open should succeed");

    let result = DataStore::open_in(dir.path(), "prefs_user");
    match result {
        Err(LoadError::InstanceAlreadyLoaded) => {}
        other => panic!("Expected InstanceAlreadyLoaded, got {:?}", other),
    }

    // Clones share the slot; it is released with the last handle
    let clone = first.clone();
    drop(first);
    assert!(DataStore::open_in(dir.path(), "prefs_user").is_err());
    drop(clone);
    DataStore::open_in(dir.path(), "prefs_user").expect("Slot should be free again");
}

#[test]
fn test_other_groups_can_open_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let _users = DataStore::open_in(dir.path(), "prefs_user").unwrap();
    let _other = DataStore::open_in(dir.path(), "prefs_other").unwrap();
}

#[test]
fn test_same_file_through_another_spelling_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let _first = DataStore::open_in(dir.path(), "prefs_user").unwrap();

    match DataStore::open_in(dir.path().join("."), "prefs_user") {
        Err(LoadError::InstanceAlreadyLoaded) => {}
        other => panic!("Expected InstanceAlreadyLoaded, got {:?}", other),
    }
    let nested = dir.path().join("sub").join("..");
    assert!(matches!(
        DataStore::open_in(nested, "prefs_user"),
        Err(LoadError::InstanceAlreadyLoaded)
    ));
}

#[test]
fn test_missing_directory_is_created_and_guarded() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config");
    let _first = DataStore::open_in(&config, "prefs_user").unwrap();
    assert!(config.is_dir());

    assert!(matches!(
        DataStore::open_in(config.join("."), "prefs_user"),
        Err(LoadError::InstanceAlreadyLoaded)
    ));
}

#[test]
fn test_memory_stores_are_independent() {
    let first = DataStore::open_with(
        Arc::new(MemoryStorage::new()),
        "prefs_user",
        StoreOptions::default(),
    );
    let second = DataStore::open_with(
        Arc::new(MemoryStorage::new()),
        "prefs_user",
        StoreOptions::default(),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[test]
fn test_deserialization_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prefs_user.toml"), "key_name = ").unwrap();

    match DataStore::open_in(dir.path(), "prefs_user") {
        Err(LoadError::DeserializationError(location, _)) => {
            assert!(location.contains("prefs_user.toml"));
        }
        other => panic!("Expected DeserializationError, got {:?}", other),
    }

    // A failed open does not hold on to the file
    std::fs::write(dir.path().join("prefs_user.toml"), "key_name = \"ok\"").unwrap();
    DataStore::open_in(dir.path(), "prefs_user").expect("Open should succeed after repair");
}

#[tokio::test]
async fn test_write_error_leaves_snapshot_untouched() {
    let options = StoreOptions {
        single_instance: false,
        ..StoreOptions::default()
    };
    let store = DataStore::open_with(Arc::new(ReadOnlyStorage), "prefs_user", options).unwrap();

    let result = User::new("Alice", true).save(&store).await;
    match result {
        Err(StoreError::Storage(e)) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
        other => panic!("Expected storage error, got {:?}", other),
    }
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_memory_backed_store() {
    let store = DataStore::open_with(
        Arc::new(MemoryStorage::new()),
        "prefs_user",
        StoreOptions::default(),
    )
    .unwrap();
    User::new("Alice", false).save(&store).await.unwrap();
    assert_eq!(User::load(&store), User::new("Alice", false));
    assert_eq!(store.file_path(), "memory::prefs_user.toml");
}

#[test]
fn test_storage_error_display() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test error");
    let load_error = LoadError::StorageError(io_error);
    let display = format!("{}", load_error);
    assert!(display.contains("storage error"));
    assert!(display.contains("test error"));
}

#[test]
fn test_error_trait_implementation() {
    let error = LoadError::InstanceAlreadyLoaded;
    let _: &dyn std::error::Error = &error;
    let error = StoreError::Background("gone".to_string());
    let _: &dyn std::error::Error = &error;
}
