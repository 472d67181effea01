//! Batch moves of mixed folder/file selections.

use tracing::warn;
use uuid::Uuid;

use cumulus_core::types::{BatchMoveError, BatchMoveReport, ItemRef};

use crate::file::FileService;
use crate::folder::FolderService;

/// Applies a batch of moves to a common destination, one item at a time.
///
/// There is no batch-level transaction or rollback: each item succeeds
/// or fails on its own, in input order, and the report lists both sides.
/// An empty batch yields an empty report. A folder whose reparent
/// succeeded counts as moved even if its cascade resync was partial;
/// the per-file cascade failures are retried by re-running the resync,
/// not by re-moving the folder.
#[derive(Debug, Clone)]
pub struct BatchMoveCoordinator {
    folders: FolderService,
    files: FileService,
}

impl BatchMoveCoordinator {
    pub fn new(folders: FolderService, files: FileService) -> Self {
        Self { folders, files }
    }

    /// Move every item in `items` under `new_parent_id` (the root when
    /// None). Folders land as children of the destination; files land
    /// inside it.
    pub async fn move_many(
        &self,
        owner_id: Uuid,
        items: &[ItemRef],
        new_parent_id: Option<Uuid>,
    ) -> BatchMoveReport {
        let mut report = BatchMoveReport::default();

        for item in items {
            let outcome = match item {
                ItemRef::Folder(id) => self
                    .folders
                    .move_folder(owner_id, *id, new_parent_id)
                    .await
                    .map(|_| ()),
                ItemRef::File(id) => self
                    .files
                    .move_file(owner_id, *id, new_parent_id)
                    .await
                    .map(|_| ()),
            };

            match outcome {
                Ok(()) => report.moved.push(*item),
                Err(error) => {
                    warn!(
                        owner_id = %owner_id,
                        item_id = %item.id(),
                        error = %error,
                        "Batch move item failed"
                    );
                    report.errors.push(BatchMoveError { item: *item, error });
                }
            }
        }

        report
    }
}
