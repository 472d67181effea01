//! Shared test helpers for hierarchy engine tests.
#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use cumulus_core::config::storage::StorageConfig;
use cumulus_database::memory::{MemoryAuditSink, MemoryFileRepository, MemoryFolderRepository};
use cumulus_entity::file::File;
use cumulus_entity::folder::Folder;
use cumulus_service::{BatchMoveCoordinator, FileService, FolderService};
use cumulus_storage::MemoryBlobStore;

/// Test engine wired against in-memory record stores and an in-memory
/// blob store, for a single acting owner.
pub struct TestApp {
    /// Acting owner for all helper operations
    pub owner: Uuid,
    /// Folder operations under test
    pub folders: FolderService,
    /// File operations under test
    pub files: FileService,
    /// Batch move coordinator under test
    pub batch: BatchMoveCoordinator,
    /// Direct handle to the folder record store
    pub folder_repo: Arc<MemoryFolderRepository>,
    /// Direct handle to the file record store (for failure injection)
    pub file_repo: Arc<MemoryFileRepository>,
    /// Direct handle to the blob store (for failure injection)
    pub blobs: Arc<MemoryBlobStore>,
    /// Audit sink capturing soft-delete/restore events
    pub audit: Arc<MemoryAuditSink>,
}

impl TestApp {
    /// Build a fresh engine with empty stores.
    pub fn new() -> Self {
        let folder_repo = Arc::new(MemoryFolderRepository::new());
        let file_repo = Arc::new(MemoryFileRepository::new());
        let blobs = Arc::new(MemoryBlobStore::new("http://blobs.test"));
        let audit = Arc::new(MemoryAuditSink::new());
        let storage = StorageConfig::default();

        let folders = FolderService::new(
            folder_repo.clone(),
            file_repo.clone(),
            blobs.clone(),
            audit.clone(),
        );
        let files = FileService::new(
            file_repo.clone(),
            folder_repo.clone(),
            blobs.clone(),
            audit.clone(),
            &storage,
        );
        let batch = BatchMoveCoordinator::new(folders.clone(), files.clone());

        Self {
            owner: Uuid::new_v4(),
            folders,
            files,
            batch,
            folder_repo,
            file_repo,
            blobs,
            audit,
        }
    }

    /// Create a folder as the acting owner, panicking on failure.
    pub async fn mkdir(&self, parent_id: Option<Uuid>, name: &str) -> Folder {
        self.folders
            .create(self.owner, parent_id, name)
            .await
            .expect("folder creation failed")
    }

    /// Upload a small text file as the acting owner.
    pub async fn upload(&self, folder_id: Option<Uuid>, name: &str) -> File {
        self.files
            .upload(
                self.owner,
                folder_id,
                name,
                Some("text/plain".to_string()),
                Bytes::from_static(b"hello"),
            )
            .await
            .expect("file upload failed")
    }

    /// Re-read a file record directly from the store.
    pub async fn file(&self, file_id: Uuid) -> File {
        self.files
            .get_file(self.owner, file_id)
            .await
            .expect("file not found")
    }
}
