mod common;

use common::setup_of;
use tempfile::TempDir;
use test_support::unique_name;
use turntally::SetupStore;

#[tokio::test]
async fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = SetupStore::new(dir.path().join("setups"));
    let setup = setup_of(&["Ann", "Bob"]);
    let key = unique_name("weekly");

    store.save(&key, &setup).await.unwrap();
    assert_eq!(store.load(&key).await.unwrap(), Some(setup));
}

#[tokio::test]
async fn save_replaces_previous_setup() {
    let dir = TempDir::new().unwrap();
    let store = SetupStore::new(dir.path());

    store.save("k", &setup_of(&["Ann"])).await.unwrap();
    store.save("k", &setup_of(&["Bob", "Cy"])).await.unwrap();
    let loaded = store.load("k").await.unwrap().unwrap();
    assert_eq!(loaded.players.len(), 2);
}

#[tokio::test]
async fn missing_key_is_none() {
    let dir = TempDir::new().unwrap();
    let store = SetupStore::new(dir.path());
    assert_eq!(store.load("nothing-here").await.unwrap(), None);
    assert!(!store.remove("nothing-here").await.unwrap());
}

#[tokio::test]
async fn keys_cannot_escape_the_directory() {
    let dir = TempDir::new().unwrap();
    let store = SetupStore::new(dir.path());
    for key in ["../evil", "a/b", "", "dot.ted"] {
        let err = store.load(key).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_SETUP_KEY", "key {key:?}");
    }
}

#[tokio::test]
async fn unreadable_file_is_a_persistence_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();
    let store = SetupStore::new(dir.path());

    let err = store.load("broken").await.unwrap_err();
    assert_eq!(err.code(), "PERSISTENCE_ERROR");
}

#[tokio::test]
async fn remove_deletes_the_setup() {
    let dir = TempDir::new().unwrap();
    let store = SetupStore::new(dir.path());
    store.save("gone", &setup_of(&["Ann"])).await.unwrap();

    assert!(store.remove("gone").await.unwrap());
    assert_eq!(store.load("gone").await.unwrap(), None);
}

#[tokio::test]
async fn require_reports_missing_setup() {
    let dir = TempDir::new().unwrap();
    let store = SetupStore::new(dir.path());

    let err = store.require("tuesday").await.unwrap_err();
    assert_eq!(err.code(), "SETUP_NOT_FOUND");
    assert!(!err.is_retryable());

    store.save("tuesday", &setup_of(&["Ann"])).await.unwrap();
    assert_eq!(store.require("tuesday").await.unwrap(), setup_of(&["Ann"]));
}

#[tokio::test]
async fn filesystem_failure_is_retryable() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("setups");
    std::fs::write(&blocker, b"a file where the directory should be").unwrap();
    let store = SetupStore::new(&blocker);

    let err = store.save("k", &setup_of(&["Ann"])).await.unwrap_err();
    assert_eq!(err.code(), "PERSISTENCE_ERROR");
    assert!(err.is_retryable());
}
