//! Integration tests for folder moves and the cascade resync.

mod helpers;

use cumulus_core::error::ErrorKind;
use cumulus_core::traits::BlobStore;

#[tokio::test]
async fn test_move_folder_relocates_descendant_blobs() {
    let app = helpers::TestApp::new();

    let docs = app.mkdir(None, "docs").await;
    let reports = app.mkdir(Some(docs.id), "reports").await;
    let archive = app.mkdir(None, "archive").await;

    let top = app.upload(Some(docs.id), "readme.md").await;
    let deep = app.upload(Some(reports.id), "q3.pdf").await;
    assert!(deep.storage_key.contains("/docs/reports/"));

    let outcome = app
        .folders
        .move_folder(app.owner, docs.id, Some(archive.id))
        .await
        .unwrap();
    assert_eq!(outcome.folder.parent_id, Some(archive.id));
    assert!(outcome.cascade.is_complete());
    assert_eq!(outcome.cascade.relocated.len(), 2);

    let top = app.file(top.id).await;
    let deep = app.file(deep.id).await;
    assert!(top.storage_key.contains("/archive/docs/"));
    assert!(deep.storage_key.contains("/archive/docs/reports/"));
    // Only the path segment changed; the id-and-extension leaf is stable.
    assert!(deep.storage_key.ends_with(&format!("{}.pdf", deep.id)));

    // Blobs followed their records; the old keys are gone.
    assert!(app.blobs.read_bytes(&top.storage_key).await.is_ok());
    assert!(app.blobs.read_bytes(&deep.storage_key).await.is_ok());
    assert_eq!(app.blobs.len(), 2);
}

#[tokio::test]
async fn test_move_folder_to_root() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    let sub = app.mkdir(Some(docs.id), "sub").await;
    let file = app.upload(Some(sub.id), "a.txt").await;

    let outcome = app.folders.move_folder(app.owner, sub.id, None).await.unwrap();
    assert!(outcome.folder.is_root());

    let file = app.file(file.id).await;
    assert!(!file.storage_key.contains("/docs/"));
    assert!(file.storage_key.contains("/sub/"));
}

#[tokio::test]
async fn test_move_rejects_self_parent() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;

    let err = app
        .folders
        .move_folder(app.owner, docs.id, Some(docs.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_move_rejects_cycle() {
    let app = helpers::TestApp::new();
    let a = app.mkdir(None, "a").await;
    let b = app.mkdir(Some(a.id), "b").await;
    let c = app.mkdir(Some(b.id), "c").await;

    let err = app
        .folders
        .move_folder(app.owner, a.id, Some(c.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_move_rejects_foreign_parent() {
    let app = helpers::TestApp::new();
    let mine = app.mkdir(None, "mine").await;

    let stranger = uuid::Uuid::new_v4();
    let err = app
        .folders
        .move_folder(stranger, mine.id, None)
        .await
        .unwrap_err();
    // The subject itself is invisible to the other owner.
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_move_to_current_parent_is_noop() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    app.upload(Some(docs.id), "a.txt").await;
    let moves_before = app.blobs.rename_count();

    let outcome = app.folders.move_folder(app.owner, docs.id, None).await.unwrap();

    assert!(outcome.cascade.relocated.is_empty());
    assert_eq!(app.blobs.rename_count(), moves_before);
}

#[tokio::test]
async fn test_cascade_partial_failure_reported_and_retryable() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    let archive = app.mkdir(None, "archive").await;
    let stuck = app.upload(Some(docs.id), "stuck.txt").await;
    let fine = app.upload(Some(docs.id), "fine.txt").await;

    // Fail exactly the blob moves touching the first file's key.
    app.blobs.fail_renames_matching(Some(&stuck.id.to_string()));

    let outcome = app
        .folders
        .move_folder(app.owner, docs.id, Some(archive.id))
        .await
        .unwrap();

    assert!(!outcome.cascade.is_complete());
    assert_eq!(outcome.cascade.relocated, vec![fine.id]);
    assert_eq!(outcome.cascade.failures.len(), 1);
    assert_eq!(outcome.cascade.failures[0].file_id, stuck.id);

    // The failed file still agrees with itself: record and blob both on
    // the old key.
    let stuck_now = app.file(stuck.id).await;
    assert_eq!(stuck_now.storage_key, stuck.storage_key);
    assert!(app.blobs.read_bytes(&stuck.storage_key).await.is_ok());

    // Re-running the cascade after the outage picks up only the stragglers.
    app.blobs.fail_renames_matching(None);
    let retry = app.folders.resync_subtree(app.owner, docs.id).await.unwrap();
    assert_eq!(retry.relocated, vec![stuck.id]);
    assert_eq!(retry.unchanged, 1);
    assert!(retry.is_complete());

    let stuck_now = app.file(stuck.id).await;
    assert!(stuck_now.storage_key.contains("/archive/docs/"));
}

#[tokio::test]
async fn test_concurrent_move_detected_by_conditional_update() {
    let app = helpers::TestApp::new();
    let a = app.mkdir(None, "a").await;
    let b = app.mkdir(None, "b").await;

    // A competing move lands after validation observed `a` at the root.
    app.folders.move_folder(app.owner, a.id, Some(b.id)).await.unwrap();

    use cumulus_database::repositories::FolderRepository;
    let err = app
        .folder_repo
        .move_folder(app.owner, a.id, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_walkers_terminate_on_corrupt_parent_cycle() {
    use cumulus_database::repositories::FolderRepository;
    use cumulus_service::path::ROOT_PATH;
    use cumulus_service::{PathResolver, TreeInvariantChecker};

    let app = helpers::TestApp::new();
    let a = app.mkdir(None, "a").await;
    let b = app.mkdir(Some(a.id), "b").await;

    // Corrupt the tree behind validation's back so a and b parent each
    // other. Both walkers must terminate via their visited sets.
    app.folder_repo
        .move_folder(app.owner, a.id, Some(b.id), None)
        .await
        .unwrap();

    let resolver = PathResolver::new(app.folder_repo.clone());
    let path = resolver
        .resolve_folder_path(app.owner, Some(b.id))
        .await
        .unwrap();
    assert_eq!(path, ROOT_PATH);

    let checker = TreeInvariantChecker::new(app.folder_repo.clone());
    let inside = checker
        .is_descendant(app.owner, b.id, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(!inside);
}

#[tokio::test]
async fn test_resync_is_idempotent() {
    let app = helpers::TestApp::new();
    let docs = app.mkdir(None, "docs").await;
    app.upload(Some(docs.id), "a.txt").await;
    app.upload(Some(docs.id), "b.txt").await;

    let report = app.folders.resync_subtree(app.owner, docs.id).await.unwrap();

    assert!(report.relocated.is_empty());
    assert_eq!(report.unchanged, 2);
}
