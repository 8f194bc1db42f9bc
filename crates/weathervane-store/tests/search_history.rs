//! Integration tests for the file-backed search history.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use weathervane_store::{SearchBackend, SearchClient, SqliteSearchStore};
use weathervane_weather::SearchRecord;

#[test]
fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("searches.db");

    let record = SearchRecord::mock("New York", 11);
    {
        let store = SqliteSearchStore::new(&path).unwrap();
        store.upsert(&record).unwrap();
    }

    let store = SqliteSearchStore::new(&path).unwrap();
    let searches = store.list_searches().unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].id, record.id);
    assert_eq!(searches[0].time, "Tue Jul 09 2024 11 AM");
    assert_eq!(searches[0].temperature, "20.2°C");
}

#[test]
fn test_new_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.db");

    let store = SqliteSearchStore::new(&path).unwrap();
    assert!(path.exists());
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_reopened_upsert_preserves_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("searches.db");

    let first = SearchRecord::mock("Sydney", 2);
    {
        let client = SearchClient::sqlite(SqliteSearchStore::new(&path).unwrap());
        client.upsert(first.clone()).await.unwrap();
    }

    let client = SearchClient::sqlite(SqliteSearchStore::new(&path).unwrap());
    let stored = client.upsert(SearchRecord::mock("Sydney", 5)).await.unwrap();

    assert_eq!(stored.id, first.id);
    let searches = client.list_searches().await.unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].time, "Tue Jul 09 2024 5 AM");
}

#[tokio::test]
async fn test_concurrent_upserts_of_distinct_cities() {
    let client = SearchClient::in_memory().unwrap();

    let handles: Vec<_> = ["Paris", "Berlin", "Rome", "Madrid"]
        .into_iter()
        .enumerate()
        .map(|(i, city)| {
            let client = client.clone();
            tokio::spawn(async move { client.upsert(SearchRecord::mock(city, i as u32)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let cities: Vec<_> = client
        .list_searches()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.city)
        .collect();
    assert_eq!(cities, ["Madrid", "Rome", "Berlin", "Paris"]);
}
