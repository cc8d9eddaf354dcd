use super::*;

use tempfile::TempDir;

use crate::config::StorageConfig;
use satchel::artifact::ArtifactPath;
use satchel::class::ClassId;

async fn storage() -> (TempDir, LocalStorage) {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(&StorageConfig {
        path: dir.path().join("finals"),
        max_upload_size: 1024,
    })
    .await
    .unwrap();

    (dir, storage)
}

#[tokio::test]
async fn test_ensure_directory_concurrent() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("a/b/c");

    let futures = (0..16).map(|_| ensure_directory(&target));
    for result in futures::future::join_all(futures).await {
        result.unwrap();
    }

    assert!(target.is_dir());

    // Idempotent
    ensure_directory(&target).await.unwrap();
}

#[tokio::test]
async fn test_ensure_directory_over_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("occupied");
    std::fs::write(&target, b"").unwrap();

    ensure_directory(&target).await.unwrap_err();
}

#[tokio::test]
async fn test_remove_if_exists() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("file");
    std::fs::write(&target, b"data").unwrap();

    assert!(remove_if_exists(&target).await.unwrap());
    assert!(!remove_if_exists(&target).await.unwrap());
}

#[tokio::test]
async fn test_stage_and_place() {
    let (_dir, storage) = storage().await;
    let class = ClassId::new("CS101".to_string()).unwrap();
    let artifact = ArtifactPath::parse("CS101/20230001_Alice.zip").unwrap();

    let (staged, _file) = storage
        .create_staged("homework.zip".to_string())
        .await
        .unwrap();
    assert!(staged.path.starts_with(storage.incoming_dir()));

    storage.ensure_class_dir(&class).await.unwrap();
    storage.place(&staged.path, &artifact).await.unwrap();

    assert!(!staged.path.exists());
    assert!(storage.artifact_path(&artifact).is_file());
    assert_eq!(
        storage.root().join("CS101/20230001_Alice.zip"),
        storage.artifact_path(&artifact)
    );

    assert!(storage.remove_artifact(&artifact).await.unwrap());
    assert!(!storage.remove_artifact(&artifact).await.unwrap());
}

#[tokio::test]
async fn test_place_into_missing_class_dir() {
    let (_dir, storage) = storage().await;
    let artifact = ArtifactPath::parse("CS101/20230001_Alice.zip").unwrap();

    let (staged, _file) = storage
        .create_staged("homework.zip".to_string())
        .await
        .unwrap();

    let e = storage.place(&staged.path, &artifact).await.unwrap_err();
    assert!(matches!(e, ServerError::StorageError(_)));
}
