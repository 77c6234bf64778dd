use bytes::Bytes;

use dealcoach::application::ports::{MediaStore, MediaStoreError};
use dealcoach::domain::{SessionId, StoragePath};
use dealcoach::infrastructure::storage::LocalMediaStore;

fn audio_path() -> StoragePath {
    StoragePath::for_audio(&SessionId::new(), "call.webm")
}

#[tokio::test]
async fn stored_bytes_round_trip_through_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalMediaStore::new(dir.path().join("media")).unwrap();
    let path = audio_path();

    store
        .put(&path, Bytes::from_static(b"fake audio bytes"))
        .await
        .unwrap();

    let fetched = store.fetch(&path).await.unwrap();
    assert_eq!(fetched, b"fake audio bytes");
}

#[tokio::test]
async fn the_local_path_points_at_a_readable_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalMediaStore::new(dir.path().join("media")).unwrap();
    let path = audio_path();

    store
        .put(&path, Bytes::from_static(b"on disk"))
        .await
        .unwrap();

    let file_path = store.local_file_path(&path).expect("local store has paths");
    let contents = std::fs::read(file_path).unwrap();
    assert_eq!(contents, b"on disk");
}

#[tokio::test]
async fn deleted_objects_are_gone() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalMediaStore::new(dir.path().join("media")).unwrap();
    let path = audio_path();

    store
        .put(&path, Bytes::from_static(b"ephemeral"))
        .await
        .unwrap();
    store.delete(&path).await.unwrap();

    let result = store.fetch(&path).await;
    assert!(matches!(
        result,
        Err(MediaStoreError::NotFound(_)) | Err(MediaStoreError::DownloadFailed(_))
    ));
}

#[tokio::test]
async fn fetching_a_missing_object_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalMediaStore::new(dir.path().join("media")).unwrap();

    let result = store.fetch(&audio_path()).await;
    assert!(result.is_err());
}
