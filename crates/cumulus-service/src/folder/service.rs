use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use cumulus_core::error::ErrorKind;
use cumulus_core::traits::BlobStore;
use cumulus_core::types::{CascadeFailure, CascadeReport, MoveRejection};
use cumulus_core::{AppError, AppResult};
use cumulus_database::repositories::{AuditSink, FileRepository, FolderRepository};
use cumulus_entity::audit::CreateAuditLogEntry;
use cumulus_entity::file::File;
use cumulus_entity::folder::{CreateFolder, Folder};

use crate::path::PathResolver;
use crate::tree::TreeInvariantChecker;

/// Upper bound on sibling-name disambiguation attempts before giving up
/// with a `NAMING_EXHAUSTED` error.
const MAX_NAME_ATTEMPTS: u32 = 64;

/// Result of a folder move: the reparented folder plus the outcome of
/// the subtree key resync that followed it.
#[derive(Debug, Clone)]
pub struct FolderMoveOutcome {
    pub folder: Folder,
    pub cascade: CascadeReport,
}

/// Folder operations over the logical tree.
///
/// Every operation is scoped to an acting owner. Moves are validated by
/// the [`TreeInvariantChecker`], applied conditionally against the
/// parent observed during validation, and followed by a best-effort
/// subtree resync that relocates blobs whose keys went stale.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderRepository>,
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
    audit: Arc<dyn AuditSink>,
    paths: PathResolver,
    checker: TreeInvariantChecker,
}

impl FolderService {
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        files: Arc<dyn FileRepository>,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            paths: PathResolver::new(folders.clone()),
            checker: TreeInvariantChecker::new(folders.clone()),
            folders,
            files,
            blobs,
            audit,
        }
    }

    /// Fetch a folder owned by the acting user.
    pub async fn get_folder(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_owned(owner_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// List the direct children of a folder (root when `parent_id` is
    /// None), soft-deleted children included.
    pub async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        self.folders.list_children(owner_id, parent_id).await
    }

    /// Create a folder under `parent_id`.
    ///
    /// If a live sibling already holds the requested name, retries with
    /// ` (2)`, ` (3)`, ... suffixes up to [`MAX_NAME_ATTEMPTS`], then
    /// fails with `NAMING_EXHAUSTED`.
    pub async fn create(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        self.checker.check_parent(owner_id, parent_id).await?.into_result()?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 1 {
                name.to_string()
            } else {
                format!("{name} ({attempt})")
            };

            match self
                .folders
                .create(&CreateFolder {
                    parent_id,
                    name: candidate.clone(),
                    owner_id,
                })
                .await
            {
                Ok(folder) => {
                    info!(owner_id = %owner_id, folder_id = %folder.id, name = %folder.name, "Folder created");
                    return Ok(folder);
                }
                Err(err) if err.kind == ErrorKind::Conflict => {
                    debug!(owner_id = %owner_id, name = %candidate, "Folder name taken, retrying with suffix");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        Err(AppError::naming_exhausted(format!(
            "Could not find a free name for '{name}' after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }

    /// Rename a folder and resync the storage keys of every file in its
    /// subtree, since the folder's name is a segment of all of them.
    pub async fn rename(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<(Folder, CascadeReport)> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        let folder = self.folders.rename(owner_id, folder_id, new_name).await?;
        let cascade = self.resync_subtree(owner_id, folder_id).await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            name = %folder.name,
            relocated = cascade.relocated.len(),
            failed = cascade.failures.len(),
            "Folder renamed"
        );
        Ok((folder, cascade))
    }

    /// Flip the shared flag on a folder.
    pub async fn toggle_sharing(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        is_shared: bool,
    ) -> AppResult<Folder> {
        let folder = self.folders.set_shared(owner_id, folder_id, is_shared).await?;
        info!(owner_id = %owner_id, folder_id = %folder_id, is_shared, "Folder sharing toggled");
        Ok(folder)
    }

    /// Move a folder under a new parent.
    ///
    /// Validation and the update are not atomic: the repository applies
    /// the reparent only if the parent still matches what validation
    /// observed, and reports a `Conflict` otherwise. Moving a folder to
    /// its current parent is a no-op. After a successful reparent the
    /// whole subtree's file keys are resynced; resync failures are
    /// reported in the outcome, not raised.
    pub async fn move_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<FolderMoveOutcome> {
        let subject = self
            .folders
            .find_owned(owner_id, folder_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or(MoveRejection::NotFound)?;

        self.checker
            .validate_move_target(owner_id, folder_id, new_parent_id)
            .await?
            .into_result()?;

        if subject.parent_id == new_parent_id {
            debug!(owner_id = %owner_id, folder_id = %folder_id, "Folder already under requested parent");
            return Ok(FolderMoveOutcome { folder: subject, cascade: CascadeReport::default() });
        }

        let folder = self
            .folders
            .move_folder(owner_id, folder_id, new_parent_id, subject.parent_id)
            .await?;
        let cascade = self.resync_subtree(owner_id, folder_id).await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            new_parent_id = ?new_parent_id,
            relocated = cascade.relocated.len(),
            unchanged = cascade.unchanged,
            failed = cascade.failures.len(),
            "Folder moved"
        );
        Ok(FolderMoveOutcome { folder, cascade })
    }

    /// Move a folder to the trash, remembering where it came from so a
    /// later restore puts it back.
    pub async fn soft_delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        let folder = self.folders.soft_delete(owner_id, folder_id).await?;

        self.record_audit(
            owner_id,
            "folder.soft_delete",
            folder_id,
            json!({
                "name": folder.name,
                "original_parent_id": folder.original_parent_id,
                "deleted_at": folder.deleted_at,
            }),
        )
        .await;

        info!(owner_id = %owner_id, folder_id = %folder_id, "Folder moved to trash");
        Ok(folder)
    }

    /// Restore a trashed folder to its original parent.
    ///
    /// The snapshot is applied verbatim even if the original parent has
    /// itself been deleted since; path resolution then falls back to
    /// the root sentinel until the parent is restored too.
    pub async fn restore(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        let folder = self.folders.restore(owner_id, folder_id).await?;

        self.record_audit(
            owner_id,
            "folder.restore",
            folder_id,
            json!({
                "name": folder.name,
                "parent_id": folder.parent_id,
            }),
        )
        .await;

        info!(owner_id = %owner_id, folder_id = %folder_id, "Folder restored from trash");
        Ok(folder)
    }

    /// Remove a folder record for good. Does not touch descendants or
    /// blobs; callers empty the folder first.
    pub async fn permanent_delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<()> {
        let removed = self.folders.delete(owner_id, folder_id).await?;
        if !removed {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        info!(owner_id = %owner_id, folder_id = %folder_id, "Folder permanently deleted");
        Ok(())
    }

    /// Walk the subtree rooted at `folder_id` and bring every file's
    /// storage key back in line with its logical path.
    ///
    /// The cascade is file-by-file and never transactional: each file
    /// either relocates cleanly, was already correct, or lands in the
    /// report's failure list with its key unchanged. Re-running the
    /// cascade retries exactly the files that failed. Soft-deleted
    /// subfolders and files are traversed too, so trashed items keep
    /// consistent keys.
    pub async fn resync_subtree(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<CascadeReport> {
        let mut report = CascadeReport::default();
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut stack = vec![folder_id];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }

            let path = self.paths.resolve_folder_path(owner_id, Some(id)).await?;

            for file in self.files.list_in_folder(owner_id, Some(id)).await? {
                self.resync_file(owner_id, &path, &file, &mut report).await;
            }
            for child in self.folders.list_children(owner_id, Some(id)).await? {
                stack.push(child.id);
            }
        }

        Ok(report)
    }

    async fn resync_file(
        &self,
        owner_id: Uuid,
        folder_path: &str,
        file: &File,
        report: &mut CascadeReport,
    ) {
        let expected = PathResolver::compose_key(owner_id, folder_path, file.id, &file.name);
        if expected == file.storage_key {
            report.unchanged += 1;
            return;
        }

        if let Err(err) = self.blobs.rename(&file.storage_key, &expected).await {
            warn!(file_id = %file.id, error = %err, "Blob relocation failed during cascade resync");
            report.failures.push(CascadeFailure { file_id: file.id, error: err });
            return;
        }

        match self
            .files
            .update_storage_key(owner_id, file.id, &expected)
            .await
        {
            Ok(_) => report.relocated.push(file.id),
            Err(err) => {
                // Put the blob back so the record stays truthful and a
                // re-run of the cascade can retry from a clean state.
                let failure = match self.blobs.rename(&expected, &file.storage_key).await {
                    Ok(()) => err,
                    Err(revert_err) => AppError::consistency(format!(
                        "File {} has blob at '{expected}' but record still points to \
                         '{}': key update failed ({err}) and the move-back failed ({revert_err})",
                        file.id, file.storage_key
                    )),
                };
                warn!(file_id = %file.id, error = %failure, "Key update failed during cascade resync");
                report.failures.push(CascadeFailure { file_id: file.id, error: failure });
            }
        }
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
            target_type: "folder".to_string(),
            target_id,
            details: Some(details),
        };
        // Audit is best-effort; a sink outage must not fail the user's
        // operation.
        if let Err(err) = self.audit.record(&entry).await {
            warn!(action, target_id = %target_id, error = %err, "Failed to record audit entry");
        }
    }
}
