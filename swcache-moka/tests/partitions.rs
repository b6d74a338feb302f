//! Tests for Moka partition storage.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use swcache_backend::{Backend, BackendError, DeleteStatus, Storage};
use swcache_core::{CacheEntry, PartitionName, RequestKey};
use swcache_moka::MokaStorage;

fn make_key(id: u32) -> RequestKey {
    RequestKey::get(format!("https://praise.example/api/songs/{id}"))
}

fn make_entry(size: usize) -> CacheEntry {
    CacheEntry::new(StatusCode::OK, HeaderMap::new(), Bytes::from(vec![0u8; size]))
}

#[tokio::test]
async fn open_is_idempotent() {
    let storage = MokaStorage::builder().build();
    let name = PartitionName::new("praise-static-v1");

    let first = storage.open(&name).await.unwrap();
    first.write(&make_key(1), make_entry(10)).await.unwrap();

    let second = storage.open(&name).await.unwrap();
    assert!(second.read(&make_key(1)).await.unwrap().is_some());
    assert_eq!(storage.names().await.unwrap(), vec![name]);
}

#[tokio::test]
async fn names_follow_creation_order() {
    let storage = MokaStorage::builder().build();
    for name in ["praise-static-v1", "praise-data-v1", "legacy"] {
        storage.open(&name.into()).await.unwrap();
    }
    storage.delete(&"praise-data-v1".into()).await.unwrap();
    storage.open(&"praise-data-v2".into()).await.unwrap();

    let names: Vec<String> = storage
        .names()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, ["praise-static-v1", "legacy", "praise-data-v2"]);
}

#[tokio::test]
async fn delete_missing_partition_returns_false() {
    let storage = MokaStorage::builder().build();
    assert!(!storage.delete(&"nope".into()).await.unwrap());
}

#[tokio::test]
async fn deleted_partition_reopens_empty() {
    let storage = MokaStorage::builder().build();
    let name = PartitionName::new("praise-data-v1");

    let old = storage.open(&name).await.unwrap();
    old.write(&make_key(1), make_entry(10)).await.unwrap();
    assert!(storage.delete(&name).await.unwrap());

    let fresh = storage.open(&name).await.unwrap();
    assert!(fresh.read(&make_key(1)).await.unwrap().is_none());
    // The earlier handle still sees its own data.
    assert!(old.read(&make_key(1)).await.unwrap().is_some());
}

#[tokio::test]
async fn partition_quota_rejects_new_partitions() {
    let storage = MokaStorage::builder()
        .max_entries(10)
        .max_partitions(2)
        .build();

    storage.open(&"a".into()).await.unwrap();
    storage.open(&"b".into()).await.unwrap();
    // Reopening an existing partition is not a new allocation.
    storage.open(&"a".into()).await.unwrap();

    let err = storage.open(&"c".into()).await.err().unwrap();
    assert!(matches!(err, BackendError::QuotaExceeded(name) if name == "c"));

    storage.delete(&"b".into()).await.unwrap();
    storage.open(&"c".into()).await.unwrap();
}

#[tokio::test]
async fn remove_and_keys() {
    let storage = MokaStorage::builder().build();
    let partition = storage.open(&"p".into()).await.unwrap();

    partition.write(&make_key(1), make_entry(1)).await.unwrap();
    partition.write(&make_key(2), make_entry(1)).await.unwrap();

    let mut keys: Vec<String> = partition
        .keys()
        .await
        .unwrap()
        .iter()
        .map(|k| k.url().to_owned())
        .collect();
    keys.sort();
    assert_eq!(
        keys,
        [
            "https://praise.example/api/songs/1",
            "https://praise.example/api/songs/2"
        ]
    );

    assert!(matches!(
        partition.remove(&make_key(1)).await.unwrap(),
        DeleteStatus::Deleted(1)
    ));
    assert!(matches!(
        partition.remove(&make_key(1)).await.unwrap(),
        DeleteStatus::Missing
    ));
}

#[tokio::test]
async fn unbounded_partition_never_evicts() {
    let storage = MokaStorage::builder().build();
    let name = PartitionName::new("praise-static-v1");
    let handle = storage.open(&name).await.unwrap();

    for i in 0..500 {
        handle.write(&make_key(i), make_entry(1_024)).await.unwrap();
    }
    storage.partition(&name).await.unwrap().cache().run_pending_tasks().await;

    for i in 0..500 {
        assert!(handle.read(&make_key(i)).await.unwrap().is_some(), "entry {i} was dropped");
    }
}

#[tokio::test]
async fn max_entries_rejects_instead_of_evicting() {
    let storage = MokaStorage::builder().max_entries(2).build();
    let name = PartitionName::new("praise-data-v1");
    let handle = storage.open(&name).await.unwrap();

    handle.write(&make_key(1), make_entry(10)).await.unwrap();
    handle.write(&make_key(2), make_entry(10)).await.unwrap();
    let err = handle.write(&make_key(3), make_entry(10)).await.unwrap_err();
    assert!(matches!(err, BackendError::QuotaExceeded(ref n) if *n == name), "{err}");

    // Overwriting a stored key does not need room.
    handle.write(&make_key(1), make_entry(20)).await.unwrap();
    storage.partition(&name).await.unwrap().cache().run_pending_tasks().await;

    assert_eq!(handle.read(&make_key(1)).await.unwrap().unwrap().body().len(), 20);
    assert!(handle.read(&make_key(2)).await.unwrap().is_some());
    assert!(handle.read(&make_key(3)).await.unwrap().is_none());

    // Removing frees a slot.
    handle.remove(&make_key(2)).await.unwrap();
    handle.write(&make_key(3), make_entry(10)).await.unwrap();
}

#[tokio::test]
async fn max_bytes_rejects_instead_of_evicting() {
    let key = make_key(1);
    let entry = make_entry(100);
    let single = key.memory_size() + entry.memory_size();

    let storage = MokaStorage::builder()
        .max_bytes((single * 3) as u64)
        .build();
    let name = PartitionName::new("praise-data-v1");
    let handle = storage.open(&name).await.unwrap();

    for i in 1..=3 {
        handle.write(&make_key(i), make_entry(100)).await.unwrap();
    }
    let err = handle.write(&make_key(4), make_entry(100)).await.unwrap_err();
    assert!(matches!(err, BackendError::QuotaExceeded(_)), "{err}");
    // A bigger snapshot for a stored key does not fit either.
    assert!(handle.write(&make_key(1), make_entry(200)).await.is_err());

    storage.partition(&name).await.unwrap().cache().run_pending_tasks().await;
    for i in 1..=3 {
        let stored = handle.read(&make_key(i)).await.unwrap().unwrap();
        assert_eq!(stored.body().len(), 100);
    }
    assert!(handle.read(&make_key(4)).await.unwrap().is_none());
}

#[tokio::test]
async fn get_never_creates_partition() {
    let storage = MokaStorage::builder().build();
    let name = PartitionName::new("praise-data-v1");

    assert!(storage.get(&name).await.unwrap().is_none());
    assert!(storage.names().await.unwrap().is_empty());

    let opened = storage.open(&name).await.unwrap();
    opened.write(&make_key(1), make_entry(10)).await.unwrap();
    let found = storage.get(&name).await.unwrap().unwrap();
    assert!(found.read(&make_key(1)).await.unwrap().is_some());

    storage.delete(&name).await.unwrap();
    assert!(storage.get(&name).await.unwrap().is_none());
    assert!(storage.match_any(&make_key(1)).await.unwrap().is_none());
    assert!(storage.names().await.unwrap().is_empty());
}

#[tokio::test]
async fn write_replaces_whole_entry() {
    let storage = MokaStorage::builder().build();
    let partition = storage.open(&"p".into()).await.unwrap();
    let key = make_key(7);

    partition.write(&key, CacheEntry::json(&serde_json::json!({"v": 1}))).await.unwrap();
    partition.write(&key, make_entry(3)).await.unwrap();

    let stored = partition.read(&key).await.unwrap().unwrap();
    assert_eq!(stored.body().len(), 3);
    assert!(stored.headers().is_empty());
}
