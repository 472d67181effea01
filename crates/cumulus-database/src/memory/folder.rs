//! In-memory folder repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_entity::folder::model::{CreateFolder, Folder};

use crate::repositories::FolderRepository;

/// In-memory [`FolderRepository`] backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryFolderRepository {
    folders: DashMap<Uuid, Folder>,
}

impl MemoryFolderRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored folders (soft-deleted included).
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the repository holds no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// True if a live sibling with this name exists under the parent.
    fn has_live_sibling(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> bool {
        self.folders.iter().any(|entry| {
            let f = entry.value();
            f.owner_id == owner_id
                && f.parent_id == parent_id
                && f.name == name
                && f.deleted_at.is_none()
                && Some(f.id) != exclude
        })
    }
}

#[async_trait]
impl FolderRepository for MemoryFolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.folders.get(&id).map(|f| f.clone()))
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.clone()))
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        let mut children: Vec<Folder> = self
            .folders
            .iter()
            .filter(|entry| {
                let f = entry.value();
                f.owner_id == owner_id && f.parent_id == parent_id
            })
            .map(|entry| entry.value().clone())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        if self.has_live_sibling(data.owner_id, data.parent_id, &data.name, None) {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists here",
                data.name
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            parent_id: data.parent_id,
            name: data.name.clone(),
            is_shared: false,
            deleted_at: None,
            original_parent_id: None,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, owner_id: Uuid, folder_id: Uuid, new_name: &str) -> AppResult<Folder> {
        let parent_id = self
            .find_owned(owner_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?
            .parent_id;

        if self.has_live_sibling(owner_id, parent_id, new_name, Some(folder_id)) {
            return Err(AppError::conflict(format!(
                "A folder named '{new_name}' already exists here"
            )));
        }

        let mut entry = self
            .folders
            .get_mut(&folder_id)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        entry.name = new_name.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn set_shared(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        is_shared: bool,
    ) -> AppResult<Folder> {
        let mut entry = self
            .folders
            .get_mut(&folder_id)
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        entry.is_shared = is_shared;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn move_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
        expected_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let mut entry = self
            .folders
            .get_mut(&folder_id)
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| {
                AppError::conflict(format!(
                    "Folder {folder_id} was moved concurrently; re-validate and retry"
                ))
            })?;

        if entry.parent_id != expected_parent_id {
            return Err(AppError::conflict(format!(
                "Folder {folder_id} was moved concurrently; re-validate and retry"
            )));
        }

        entry.parent_id = new_parent_id;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn soft_delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        let mut entry = self
            .folders
            .get_mut(&folder_id)
            .filter(|f| f.owner_id == owner_id && f.deleted_at.is_none())
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let now = Utc::now();
        entry.original_parent_id = entry.parent_id;
        entry.deleted_at = Some(now);
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn restore(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        let mut entry = self
            .folders
            .get_mut(&folder_id)
            .filter(|f| f.owner_id == owner_id && f.deleted_at.is_some())
            .ok_or_else(|| {
                AppError::not_found(format!("Folder {folder_id} is not in the trash"))
            })?;

        entry.parent_id = entry.original_parent_id;
        entry.original_parent_id = None;
        entry.deleted_at = None;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<bool> {
        Ok(self
            .folders
            .remove_if(&folder_id, |_, f| f.owner_id == owner_id)
            .is_some())
    }
}
