//! Integration tests for file operations.

mod helpers;

use bytes::Bytes;
use cumulus_core::error::ErrorKind;
use cumulus_core::traits::BlobStore;
use uuid::Uuid;

#[tokio::test]
async fn test_upload_writes_blob_then_record() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;

    let file = app.upload(Some(docs.id), "Notes.TXT").await;

    assert_eq!(file.name, "Notes.TXT");
    assert_eq!(
        file.storage_key,
        format!("{}/docs/{}.txt", app.owner, file.id)
    );
    assert_eq!(
        app.blobs.read_bytes(&file.storage_key).await.unwrap(),
        Bytes::from_static(b"hello")
    );
}

#[tokio::test]
async fn test_upload_to_root_omits_path_segment() {
    let app = helpers::TestApp::new();

    let file = app.upload(None, "top.txt").await;

    assert_eq!(file.storage_key, format!("{}/{}.txt", app.owner, file.id));
}

#[tokio::test]
async fn test_upload_defaults_extension_for_bare_names() {
    let app = helpers::TestApp::new();

    let file = app.upload(None, "README").await;

    assert!(file.storage_key.ends_with(".bin"));
}

#[tokio::test]
async fn test_upload_record_failure_removes_orphaned_blob() {
    let app = helpers::TestApp::new();
    app.file_repo.fail_next_create();

    let err = app
        .files
        .upload(
            app.owner,
            None,
            "doomed.txt",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert!(app.blobs.is_empty());
    assert!(app.file_repo.is_empty());
}

#[tokio::test]
async fn test_upload_rejects_missing_folder() {
    let app = helpers::TestApp::new();

    let err = app
        .files
        .upload(
            app.owner,
            Some(Uuid::new_v4()),
            "lost.txt",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_upload_rejects_oversized_payload() {
    use std::sync::Arc;

    use cumulus_core::config::storage::StorageConfig;
    use cumulus_database::memory::{MemoryAuditSink, MemoryFileRepository, MemoryFolderRepository};
    use cumulus_service::FileService;
    use cumulus_storage::MemoryBlobStore;

    let storage = StorageConfig {
        max_upload_size_bytes: 3,
        ..StorageConfig::default()
    };
    let files = FileService::new(
        Arc::new(MemoryFileRepository::new()),
        Arc::new(MemoryFolderRepository::new()),
        Arc::new(MemoryBlobStore::new("http://blobs.test")),
        Arc::new(MemoryAuditSink::new()),
        &storage,
    );

    let err = files
        .upload(Uuid::new_v4(), None, "big.bin", None, Bytes::from_static(b"toolarge"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_rename_changes_name_but_not_key() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "draft.txt").await;

    let renamed = app
        .files
        .rename(app.owner, file.id, "final.pdf")
        .await
        .unwrap();

    assert_eq!(renamed.name, "final.pdf");
    assert_eq!(renamed.storage_key, file.storage_key);
}

#[tokio::test]
async fn test_move_file_relocates_blob_and_record_together() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    let file = app.upload(None, "a.txt").await;

    let moved = app
        .files
        .move_file(app.owner, file.id, Some(docs.id))
        .await
        .unwrap();

    assert_eq!(moved.folder_id, Some(docs.id));
    assert!(moved.storage_key.contains("/docs/"));
    assert!(app.blobs.read_bytes(&moved.storage_key).await.is_ok());
    assert!(app.blobs.read_bytes(&file.storage_key).await.is_err());
}

#[tokio::test]
async fn test_move_file_record_failure_moves_blob_back() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    let file = app.upload(None, "a.txt").await;

    app.file_repo.fail_next_move();
    let err = app
        .files
        .move_file(app.owner, file.id, Some(docs.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    // Compensation restored the blob under the original key; record and
    // blob still agree.
    let unchanged = app.file(file.id).await;
    assert_eq!(unchanged.storage_key, file.storage_key);
    assert!(app.blobs.read_bytes(&file.storage_key).await.is_ok());
}

#[tokio::test]
async fn test_move_file_double_failure_reports_consistency() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    let file = app.upload(None, "a.txt").await;

    // The record update fails, and by then the compensating move-back
    // (the second rename of the operation) is blocked too.
    app.file_repo.fail_next_move();
    app.blobs.fail_rename_attempt(2);

    let err = app
        .files
        .move_file(app.owner, file.id, Some(docs.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Consistency);

    // The record still carries the old key while the blob sits at the
    // new one; the error is the operator's pointer to both.
    let record = app.file(file.id).await;
    assert_eq!(record.storage_key, file.storage_key);
    assert!(app.blobs.read_bytes(&file.storage_key).await.is_err());
}

#[tokio::test]
async fn test_move_file_rejects_missing_target_folder() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "a.txt").await;

    let err = app
        .files
        .move_file(app.owner, file.id, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_permanent_delete_removes_blob_then_record() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "a.txt").await;

    app.files.permanent_delete(app.owner, file.id).await.unwrap();

    assert!(app.blobs.is_empty());
    let err = app.files.get_file(app.owner, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_permanent_delete_keeps_record_when_blob_delete_fails() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "a.txt").await;

    app.blobs.fail_next_remove();
    let err = app
        .files
        .permanent_delete(app.owner, file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);

    // Blob delete failed, so the record must survive and still agree
    // with the blob.
    let survivor = app.file(file.id).await;
    assert_eq!(survivor.storage_key, file.storage_key);
    assert!(app.blobs.read_bytes(&file.storage_key).await.is_ok());
}

#[tokio::test]
async fn test_permanent_delete_tolerates_already_missing_blob() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "a.txt").await;

    app.blobs.remove(&file.storage_key).await.unwrap();

    app.files.permanent_delete(app.owner, file.id).await.unwrap();
    let err = app.files.get_file(app.owner, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_download_url_uses_current_key() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "a.txt").await;

    let url = app.files.download_url(app.owner, file.id).await.unwrap();
    assert_eq!(url, format!("http://blobs.test/{}", file.storage_key));
}

#[tokio::test]
async fn test_toggle_sharing() {
    let app = helpers::TestApp::new();
    let file = app.upload(None, "a.txt").await;

    let shared = app
        .files
        .toggle_sharing(app.owner, file.id, true)
        .await
        .unwrap();
    assert!(shared.is_shared);
}
