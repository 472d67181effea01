use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use cumulus_core::config::storage::StorageConfig;
use cumulus_core::error::ErrorKind;
use cumulus_core::traits::BlobStore;
use cumulus_core::{AppError, AppResult};
use cumulus_database::repositories::{AuditSink, FileRepository, FolderRepository};
use cumulus_entity::audit::CreateAuditLogEntry;
use cumulus_entity::file::{CreateFile, File};

use crate::path::PathResolver;
use crate::tree::TreeInvariantChecker;

/// File operations over records and their backing blobs.
///
/// Mutations that touch both sides follow a fixed order: the blob moves
/// first, the record update follows, and a failed record update triggers
/// a compensating blob move back. Only when the compensation itself also
/// fails does the pair disagree, and that case surfaces as a
/// `CONSISTENCY` error naming both keys.
#[derive(Debug, Clone)]
pub struct FileService {
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
    audit: Arc<dyn AuditSink>,
    paths: PathResolver,
    checker: TreeInvariantChecker,
    max_upload_size_bytes: u64,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        folders: Arc<dyn FolderRepository>,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditSink>,
        storage: &StorageConfig,
    ) -> Self {
        Self {
            files,
            blobs,
            audit,
            paths: PathResolver::new(folders.clone()),
            checker: TreeInvariantChecker::new(folders),
            max_upload_size_bytes: storage.max_upload_size_bytes,
        }
    }

    /// Fetch a file owned by the acting user.
    pub async fn get_file(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        self.files
            .find_owned(owner_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// List files in a folder (root when `folder_id` is None),
    /// soft-deleted files included.
    pub async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        self.files.list_in_folder(owner_id, folder_id).await
    }

    /// Upload a new file into `folder_id`.
    ///
    /// The blob is written before the record is inserted, so a failed
    /// insert never leaves a record pointing at nothing. When the insert
    /// fails the just-written blob is removed again best-effort; an
    /// orphaned blob is wasted space, not an integrity violation.
    pub async fn upload(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
        mime_type: Option<String>,
        data: Bytes,
    ) -> AppResult<File> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        if data.len() as u64 > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }

        self.checker.check_parent(owner_id, folder_id).await?.into_result()?;

        let file_id = Uuid::new_v4();
        let size_bytes = data.len() as i64;
        let storage_key = self
            .paths
            .derive_storage_key(owner_id, folder_id, file_id, name)
            .await?;

        self.blobs.put(&storage_key, data).await?;

        let created = self
            .files
            .create(&CreateFile {
                id: file_id,
                folder_id,
                name: name.to_string(),
                storage_key: storage_key.clone(),
                mime_type,
                size_bytes,
                owner_id,
            })
            .await;

        match created {
            Ok(file) => {
                info!(
                    owner_id = %owner_id,
                    file_id = %file.id,
                    name = %file.name,
                    size_bytes,
                    "File uploaded"
                );
                Ok(file)
            }
            Err(err) => {
                if let Err(cleanup_err) = self.blobs.remove(&storage_key).await {
                    warn!(
                        storage_key = %storage_key,
                        error = %cleanup_err,
                        "Failed to remove orphaned blob after record insert failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Rename a file's logical name only.
    ///
    /// The storage key keeps the old extension until the next move or
    /// cascade resync recomputes it; a stale key is display debt, not a
    /// correctness problem.
    pub async fn rename(&self, owner_id: Uuid, file_id: Uuid, new_name: &str) -> AppResult<File> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        let file = self.files.rename(owner_id, file_id, new_name).await?;
        info!(owner_id = %owner_id, file_id = %file_id, name = %file.name, "File renamed");
        Ok(file)
    }

    /// Move a file into another folder (root when `new_folder_id` is
    /// None), relocating its blob to match the new logical path.
    ///
    /// Blob first, record second. If the record update fails the blob is
    /// moved back; if that compensation also fails, the error escalates
    /// to `CONSISTENCY` with both keys so an operator can reconcile.
    pub async fn move_file(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        new_folder_id: Option<Uuid>,
    ) -> AppResult<File> {
        let file = self.get_file(owner_id, file_id).await?;

        self.checker.check_parent(owner_id, new_folder_id).await?.into_result()?;

        let new_key = self
            .paths
            .derive_storage_key(owner_id, new_folder_id, file.id, &file.name)
            .await?;

        if file.folder_id == new_folder_id && file.storage_key == new_key {
            return Ok(file);
        }

        self.blobs.rename(&file.storage_key, &new_key).await?;

        match self
            .files
            .move_file(owner_id, file_id, new_folder_id, &new_key)
            .await
        {
            Ok(moved) => {
                info!(
                    owner_id = %owner_id,
                    file_id = %file_id,
                    new_folder_id = ?new_folder_id,
                    storage_key = %moved.storage_key,
                    "File moved"
                );
                Ok(moved)
            }
            Err(update_err) => match self.blobs.rename(&new_key, &file.storage_key).await {
                Ok(()) => Err(update_err),
                Err(revert_err) => Err(AppError::consistency(format!(
                    "File {file_id} has blob at '{new_key}' but record still points to '{}': \
                     record update failed ({update_err}) and the move-back failed ({revert_err})",
                    file.storage_key
                ))),
            },
        }
    }

    /// Flip the shared flag on a file.
    pub async fn toggle_sharing(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        is_shared: bool,
    ) -> AppResult<File> {
        let file = self.files.set_shared(owner_id, file_id, is_shared).await?;
        info!(owner_id = %owner_id, file_id = %file_id, is_shared, "File sharing toggled");
        Ok(file)
    }

    /// Move a file to the trash. The blob stays where it is.
    pub async fn soft_delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let file = self.files.soft_delete(owner_id, file_id).await?;

        self.record_audit(
            owner_id,
            "file.soft_delete",
            file_id,
            json!({
                "name": file.name,
                "folder_id": file.folder_id,
                "deleted_at": file.deleted_at,
            }),
        )
        .await;

        info!(owner_id = %owner_id, file_id = %file_id, "File moved to trash");
        Ok(file)
    }

    /// Restore a trashed file in place.
    pub async fn restore(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let file = self.files.restore(owner_id, file_id).await?;

        self.record_audit(
            owner_id,
            "file.restore",
            file_id,
            json!({
                "name": file.name,
                "folder_id": file.folder_id,
            }),
        )
        .await;

        info!(owner_id = %owner_id, file_id = %file_id, "File restored from trash");
        Ok(file)
    }

    /// Remove a file and its blob for good.
    ///
    /// The blob is removed first; if that fails the record survives so
    /// nothing ever points at a blob we know is gone while the blob
    /// lingers unreferenced. A blob that is already missing counts as
    /// removed.
    pub async fn permanent_delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<()> {
        let file = self.get_file(owner_id, file_id).await?;

        if let Err(err) = self.blobs.remove(&file.storage_key).await {
            if err.kind != ErrorKind::NotFound {
                return Err(err);
            }
        }

        self.files.delete(owner_id, file_id).await?;
        info!(owner_id = %owner_id, file_id = %file_id, "File permanently deleted");
        Ok(())
    }

    /// Public URL for a file's current blob.
    pub async fn download_url(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<String> {
        let file = self.get_file(owner_id, file_id).await?;
        Ok(self.blobs.public_url(&file.storage_key))
    }

    async fn record_audit(
        &self,
        actor_id: Uuid,
        action: &str,
        target_id: Uuid,
        details: serde_json::Value,
    ) {
        let entry = CreateAuditLogEntry {
            actor_id,
            action: action.to_string(),
            target_type: "file".to_string(),
            target_id,
            details: Some(details),
        };
        if let Err(err) = self.audit.record(&entry).await {
            warn!(action, target_id = %target_id, error = %err, "Failed to record audit entry");
        }
    }
}
