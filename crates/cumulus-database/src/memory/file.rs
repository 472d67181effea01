//! In-memory file repository.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_entity::file::model::{CreateFile, File};

use crate::repositories::FileRepository;

/// In-memory [`FileRepository`] backed by a `DashMap`.
///
/// Carries one-shot failure switches so tests can exercise the engine's
/// compensation paths (orphan-blob cleanup after a failed insert, blob
/// move-back after a failed record update).
#[derive(Debug, Default)]
pub struct MemoryFileRepository {
    files: DashMap<Uuid, File>,
    fail_next_create: AtomicBool,
    fail_next_move: AtomicBool,
}

impl MemoryFileRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files (soft-deleted included).
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the repository holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Make the next `create` call fail with a database error.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Make the next `move_file` call fail with a database error.
    pub fn fail_next_move(&self) {
        self.fail_next_move.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<File>> {
        Ok(self
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.clone()))
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        let mut files: Vec<File> = self
            .files
            .iter()
            .filter(|entry| {
                let f = entry.value();
                f.owner_id == owner_id && f.folder_id == folder_id
            })
            .map(|entry| entry.value().clone())
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("Injected create failure"));
        }

        let now = Utc::now();
        let file = File {
            id: data.id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            storage_key: data.storage_key.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            is_shared: false,
            deleted_at: None,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn rename(&self, owner_id: Uuid, file_id: Uuid, new_name: &str) -> AppResult<File> {
        let mut entry = self
            .files
            .get_mut(&file_id)
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        entry.name = new_name.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn move_file(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        new_folder_id: Option<Uuid>,
        new_storage_key: &str,
    ) -> AppResult<File> {
        if self.fail_next_move.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("Injected move failure"));
        }

        let mut entry = self
            .files
            .get_mut(&file_id)
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        entry.folder_id = new_folder_id;
        entry.storage_key = new_storage_key.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn update_storage_key(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        storage_key: &str,
    ) -> AppResult<File> {
        let mut entry = self
            .files
            .get_mut(&file_id)
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        entry.storage_key = storage_key.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn set_shared(&self, owner_id: Uuid, file_id: Uuid, is_shared: bool) -> AppResult<File> {
        let mut entry = self
            .files
            .get_mut(&file_id)
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        entry.is_shared = is_shared;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn soft_delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let mut entry = self
            .files
            .get_mut(&file_id)
            .filter(|f| f.owner_id == owner_id && f.deleted_at.is_none())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        let now = Utc::now();
        entry.deleted_at = Some(now);
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn restore(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let mut entry = self
            .files
            .get_mut(&file_id)
            .filter(|f| f.owner_id == owner_id && f.deleted_at.is_some())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} is not in the trash")))?;
        entry.deleted_at = None;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<bool> {
        Ok(self
            .files
            .remove_if(&file_id, |_, f| f.owner_id == owner_id)
            .is_some())
    }
}
