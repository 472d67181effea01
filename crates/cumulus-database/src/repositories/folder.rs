//! PostgreSQL folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::folder::model::{CreateFolder, Folder};

use super::FolderRepository;

/// Partial unique index guarding live sibling names.
const SIBLING_NAME_INDEX: &str = "folders_owner_parent_name_live_idx";

/// PostgreSQL-backed [`FolderRepository`].
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (parent_id, name, owner_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(SIBLING_NAME_INDEX) =>
            {
                AppError::conflict(format!(
                    "A folder named '{}' already exists here",
                    data.name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }

    async fn rename(&self, owner_id: Uuid, folder_id: Uuid, new_name: &str) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .bind(new_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(SIBLING_NAME_INDEX) =>
            {
                AppError::conflict(format!("A folder named '{new_name}' already exists here"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to rename folder", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    async fn set_shared(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        is_shared: bool,
    ) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET is_shared = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .bind(is_shared)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update sharing", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    async fn move_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
        expected_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
               AND parent_id IS NOT DISTINCT FROM $4 \
             RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .bind(new_parent_id)
        .bind(expected_parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(SIBLING_NAME_INDEX) =>
            {
                AppError::conflict("A folder with the same name already exists in the target")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to move folder", e),
        })?
        .ok_or_else(|| {
            AppError::conflict(format!(
                "Folder {folder_id} was moved concurrently; re-validate and retry"
            ))
        })
    }

    async fn soft_delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders \
             SET deleted_at = NOW(), original_parent_id = parent_id, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to soft-delete folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    async fn restore(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders \
             SET parent_id = original_parent_id, original_parent_id = NULL, \
                 deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NOT NULL \
             RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} is not in the trash")))
    }

    async fn delete(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(folder_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folder", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
