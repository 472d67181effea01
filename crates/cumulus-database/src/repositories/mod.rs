//! Record-store capability traits and their PostgreSQL implementations.
//!
//! The hierarchy engine in `cumulus-service` consumes these traits as
//! opaque capabilities. The PostgreSQL implementations live in this
//! module's submodules; an in-memory backend lives in [`crate::memory`].
//!
//! Every mutation and traversal is scoped by an explicit `owner_id`
//! parameter: the engine never touches records belonging to another user.

pub mod audit;
pub mod file;
pub mod folder;

use async_trait::async_trait;
use uuid::Uuid;

use cumulus_core::result::AppResult;
use cumulus_entity::audit::CreateAuditLogEntry;
use cumulus_entity::file::{CreateFile, File};
use cumulus_entity::folder::{CreateFolder, Folder};

pub use audit::PgAuditLogRepository;
pub use file::PgFileRepository;
pub use folder::PgFolderRepository;

/// Record store for folders.
#[async_trait]
pub trait FolderRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID regardless of owner.
    ///
    /// Used by move validation to distinguish a missing target from one
    /// owned by someone else.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Find a folder by ID, scoped to an owner.
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Folder>>;

    /// List the direct children of a folder (or of the root when
    /// `parent_id` is None), ordered by name. Soft-deleted children are
    /// included; visibility filtering is a presentation concern.
    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>>;

    /// Insert a new folder. A live sibling with the same name yields a
    /// `Conflict` error.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Rename a folder.
    async fn rename(&self, owner_id: Uuid, folder_id: Uuid, new_name: &str) -> AppResult<Folder>;

    /// Flip the shared flag.
    async fn set_shared(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        is_shared: bool,
    ) -> AppResult<Folder>;

    /// Reparent a folder, conditioned on the parent observed during
    /// validation. If the stored parent no longer matches
    /// `expected_parent_id` (a concurrent move won), the update touches
    /// zero rows and a `Conflict` error is returned.
    async fn move_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
        expected_parent_id: Option<Uuid>,
    ) -> AppResult<Folder>;

    /// Soft-delete: snapshot the current parent into
    /// `original_parent_id` and stamp `deleted_at`. Fails with
    /// `NotFound` if the folder is missing or already deleted.
    async fn soft_delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder>;

    /// Restore a soft-deleted folder: write the snapshotted parent back,
    /// clear the snapshot and the delete timestamp. Fails with
    /// `NotFound` if the folder is not in the trash.
    async fn restore(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder>;

    /// Hard-delete the row. Returns `true` if a row was removed. Does
    /// not cascade to descendants.
    async fn delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<bool>;
}

/// Record store for files.
#[async_trait]
pub trait FileRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a file by ID, scoped to an owner.
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<File>>;

    /// List files in a folder (or at the root when `folder_id` is
    /// None), ordered by name. Soft-deleted files are included so
    /// cascade resyncs keep their keys consistent too.
    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>>;

    /// Insert a new file record with a caller-supplied id.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Update only the logical name. The storage key is untouched.
    async fn rename(&self, owner_id: Uuid, file_id: Uuid, new_name: &str) -> AppResult<File>;

    /// Reparent a file and record its relocated storage key in one
    /// update.
    async fn move_file(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        new_folder_id: Option<Uuid>,
        new_storage_key: &str,
    ) -> AppResult<File>;

    /// Record a recomputed storage key (cascade resync).
    async fn update_storage_key(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        storage_key: &str,
    ) -> AppResult<File>;

    /// Flip the shared flag.
    async fn set_shared(&self, owner_id: Uuid, file_id: Uuid, is_shared: bool) -> AppResult<File>;

    /// Soft-delete: stamp `deleted_at`, blob retained.
    async fn soft_delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File>;

    /// Restore a soft-deleted file: clear `deleted_at`.
    async fn restore(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File>;

    /// Hard-delete the record. Returns `true` if a row was removed.
    async fn delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<bool>;
}

/// Sink for admin-relevant audit events.
///
/// The engine records soft-delete/restore actions here with before/after
/// metadata; it does not define or query the admin panel's schema.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Append an audit entry.
    async fn record(&self, entry: &CreateAuditLogEntry) -> AppResult<()>;
}
