use std::time::Duration;

use datastore_prefs::user::{save_user, user_stream};
use datastore_prefs::{CorruptionPolicy, DataStore, LoadError, PrefKey, StoreOptions, User};

#[tokio::test]
async fn test_empty_store_reads_defaults() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    assert_eq!(User::load(&store), User::new("", false));

    let mut users = user_stream(&store);
    assert_eq!(users.next().await, Some(User::new("", false)));
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    let cases = [
        ("Alice", true),
        ("", false),
        ("", true),
        ("quote \" and \\ backslash", false),
        ("multi\nline", true),
        ("名前 🚀", false),
    ];

    for (name, vip) in cases {
        save_user(&store, name, vip).await.unwrap();
        assert_eq!(User::load(&store), User::new(name, vip));
    }
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = DataStore::open_in(dir.path(), "prefs_user").unwrap();
        save_user(&store, "Alice", true).await.unwrap();
    }

    let store = DataStore::open_in(dir.path(), "prefs_user").unwrap();
    assert_eq!(User::load(&store), User::new("Alice", true));

    let contents = std::fs::read_to_string(dir.path().join("prefs_user.toml")).unwrap();
    assert!(contents.contains("key_name = \"Alice\""));
    assert!(contents.contains("key_vip = true"));
}

#[tokio::test(start_paused = true)]
async fn test_same_write_twice_is_idempotent() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    let mut users = user_stream(&store);
    assert_eq!(users.next().await, Some(User::default()));

    save_user(&store, "Alice", true).await.unwrap();
    let once = store.snapshot();
    save_user(&store, "Alice", true).await.unwrap();
    assert_eq!(store.snapshot(), once);

    // Only the first write produced an emission
    assert_eq!(users.next().await, Some(User::new("Alice", true)));
    let again = tokio::time::timeout(Duration::from_secs(1), users.next()).await;
    assert!(again.is_err(), "unchanged write should not emit");
}

#[tokio::test]
async fn test_subscription_sees_writes_from_other_handles() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    save_user(&store, "Alice", false).await.unwrap();

    // Subscribing yields the current value first
    let mut users = user_stream(&store);
    assert_eq!(users.next().await, Some(User::new("Alice", false)));

    let other = store.clone();
    save_user(&other, "Bob", true).await.unwrap();
    assert_eq!(users.next().await, Some(User::new("Bob", true)));

    // A second subscriber starts from the latest value
    let mut late = user_stream(&store);
    assert_eq!(late.next().await, Some(User::new("Bob", true)));
}

#[tokio::test]
async fn test_subscription_ends_with_store() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    let mut users = user_stream(&store);
    assert!(users.next().await.is_some());

    drop(store);
    assert_eq!(users.next().await, None);
}

#[tokio::test]
async fn test_mapped_subscription() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    let mut names = user_stream(&store).map(|user| user.name);
    assert_eq!(names.next().await.as_deref(), Some(""));

    save_user(&store, "Carol", false).await.unwrap();
    assert_eq!(names.next().await.as_deref(), Some("Carol"));
}

#[tokio::test]
async fn test_edit_can_remove_keys() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    save_user(&store, "Alice", true).await.unwrap();

    store
        .edit(|prefs| {
            prefs.remove(&User::KEY_VIP);
        })
        .await
        .unwrap();
    assert_eq!(User::load(&store), User::new("Alice", false));

    store.edit(|prefs| prefs.clear()).await.unwrap();
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_other_keys_are_preserved() {
    let store = DataStore::open_testing("prefs_user").unwrap();
    let launches: PrefKey<i64> = PrefKey::new("launches");
    store.edit(|prefs| prefs.set(&launches, 3)).await.unwrap();

    save_user(&store, "Alice", true).await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.get(&launches), Some(3));
    assert_eq!(snapshot.len(), 3);
}

#[tokio::test]
async fn test_corrupt_file_reset_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs_user.toml");
    std::fs::write(&path, "this is not toml").unwrap();

    let err = DataStore::open_in(dir.path(), "prefs_user").unwrap_err();
    assert!(matches!(err, LoadError::DeserializationError(..)));

    let options = StoreOptions {
        corruption: CorruptionPolicy::ResetToDefaults,
        ..StoreOptions::default()
    };
    let storage = std::sync::Arc::new(datastore_prefs::storage::FileStorage::new(dir.path()));
    let store = DataStore::open_with(storage, "prefs_user", options).unwrap();
    assert_eq!(User::load(&store), User::default());

    save_user(&store, "Alice", true).await.unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("key_name = \"Alice\""));
}
