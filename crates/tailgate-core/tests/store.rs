//! Profile store CRUD semantics.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use tailgate_core::{MemoryProfileStore, ProfileRecord, ProfileStore};

fn profile(id: &str, name: &str) -> ProfileRecord {
    ProfileRecord {
        id: id.into(),
        name: name.into(),
        attributes: BTreeMap::new(),
    }
}

#[tokio::test]
async fn create_then_read_returns_same_record() {
    let store = MemoryProfileStore::new();
    let created = store.create(profile("1", "foo bar")).await.unwrap();
    assert_eq!(created, profile("1", "foo bar"));
    assert_eq!(store.read("1").await.unwrap(), created);
}

#[tokio::test]
async fn duplicate_create_fails_and_keeps_first() {
    let store = MemoryProfileStore::new();
    store.create(profile("1", "first")).await.unwrap();

    let err = store.create(profile("1", "second")).await.expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "FAILED_PRECONDITION");
    assert_eq!(store.read("1").await.unwrap().name, "first");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn read_missing_names_the_id() {
    let store = MemoryProfileStore::new();
    let err = store.read("missing").await.expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "NOT_FOUND");
    assert!(err.localized_message().contains("missing"));
}

#[tokio::test]
async fn empty_id_is_rejected() {
    let store = MemoryProfileStore::new();
    let err = store.create(profile("", "anon")).await.expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_ARGUMENT");
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn update_replaces_fields_or_reports_missing() {
    let store = MemoryProfileStore::new();
    store.create(profile("1", "old")).await.unwrap();

    let mut next = profile("1", "new");
    next.attributes.insert("team".into(), "infra".into());
    assert_eq!(store.update(next.clone()).await.unwrap(), next);
    assert_eq!(store.read("1").await.unwrap(), next);

    let err = store.update(profile("2", "ghost")).await.expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "NOT_FOUND");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn delete_reports_whether_something_was_removed() {
    let store = MemoryProfileStore::new();
    store.create(profile("1", "x")).await.unwrap();

    assert!(store.delete("1").await.unwrap());
    assert!(!store.delete("1").await.unwrap());
    assert!(store.read("1").await.is_err());
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let store = MemoryProfileStore::new();
    for id in ["b", "c", "a"] {
        store.create(profile(id, id)).await.unwrap();
    }
    let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}
