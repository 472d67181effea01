//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file stored in Cumulus.
///
/// The logical `name` is what users see; `storage_key` is where the
/// bytes physically live. The key is derived from the file's current
/// folder path plus its id and extension, and must agree with the
/// logical location at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The folder containing this file (None for root).
    pub folder_id: Option<Uuid>,
    /// The logical file name (including extension).
    pub name: String,
    /// The blob key within the storage provider.
    pub storage_key: String,
    /// MIME type of the file.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Whether the file is shared.
    pub is_shared: bool,
    /// When the file was soft-deleted (None while live).
    pub deleted_at: Option<DateTime<Utc>>,
    /// The file owner.
    pub owner_id: Uuid,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Check if the file is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to create a new file record.
///
/// Unlike folders, the id is supplied by the caller: the storage key
/// embeds it and the blob is written before the record exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The file identifier, generated before the blob write.
    pub id: Uuid,
    /// The folder to place the file in (None for root).
    pub folder_id: Option<Uuid>,
    /// The logical file name.
    pub name: String,
    /// The blob key within the storage provider.
    pub storage_key: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// The file owner.
    pub owner_id: Uuid,
}
