//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in the file hierarchy.
///
/// The parent graph restricted to non-deleted folders is a forest: a
/// folder is never its own ancestor. Folders do not carry a materialized
/// path; logical paths are derived by walking `parent_id` upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Whether the folder is shared.
    pub is_shared: bool,
    /// When the folder was soft-deleted (None while live).
    pub deleted_at: Option<DateTime<Utc>>,
    /// Parent snapshot taken at soft-delete time, used by restore.
    /// Only meaningful while `deleted_at` is set.
    pub original_parent_id: Option<Uuid>,
    /// The folder owner.
    pub owner_id: Uuid,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if the folder is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Parent folder (None for root).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// The folder owner.
    pub owner_id: Uuid,
}
