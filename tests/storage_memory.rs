#![allow(missing_docs)]

use bytes::Bytes;
use mimesplit::{MemoryStorage, StorageEngine};

#[tokio::test]
async fn stores_blob_and_returns_metadata() {
    let storage = MemoryStorage::new();
    assert!(storage.is_empty().await);

    let stored = storage
        .store("face.png", "image/png", Bytes::from_static(b"hello"))
        .await
        .expect("store should succeed");

    assert_eq!(stored.file_name, "face.png");
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.size, 5);
    assert_eq!(stored.path, None);
    assert_eq!(
        storage.get("face.png").await,
        Some(Bytes::from_static(b"hello"))
    );
}

#[tokio::test]
async fn repeated_name_replaces_content_but_keeps_history() {
    let storage = MemoryStorage::new();
    for body in ["first", "second"] {
        storage
            .store("b1-1.txt", "text/plain", Bytes::from(body))
            .await
            .expect("store should succeed");
    }

    assert_eq!(storage.len().await, 1);
    assert_eq!(
        storage.get("b1-1.txt").await,
        Some(Bytes::from_static(b"second"))
    );

    let writes = storage.writes().await;
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].1, Bytes::from_static(b"first"));
}

#[tokio::test]
async fn clones_share_the_same_backing_store() {
    let storage = MemoryStorage::new();
    let handle = storage.clone();

    handle
        .store("z.bin", "", Bytes::from_static(b"z"))
        .await
        .expect("store should succeed");
    handle
        .store("a.bin", "", Bytes::from_static(b"a"))
        .await
        .expect("store should succeed");

    assert_eq!(storage.file_names().await, ["a.bin", "z.bin"]);
    assert_eq!(storage.get("missing").await, None);
}
