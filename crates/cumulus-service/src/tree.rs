//! Move-target validation for the folder forest.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use cumulus_core::AppResult;
use cumulus_core::types::{MoveCheck, MoveRejection};
use cumulus_database::repositories::FolderRepository;

/// Validates that a proposed reparenting keeps the forest acyclic and
/// never points at a missing, deleted, or foreign parent.
///
/// Checks are advisory: they read the tree as of now and a concurrent
/// move can invalidate them before the update lands. The repository's
/// conditional move catches that race and reports a conflict.
#[derive(Debug, Clone)]
pub struct TreeInvariantChecker {
    folders: Arc<dyn FolderRepository>,
}

impl TreeInvariantChecker {
    pub fn new(folders: Arc<dyn FolderRepository>) -> Self {
        Self { folders }
    }

    /// Walks `candidate_id`'s ancestor chain looking for `subject_id`.
    ///
    /// Returns `true` when the candidate sits inside the subject's
    /// subtree (a folder is its own descendant). The walk carries a
    /// visited set so a corrupt cycle terminates with `false` instead
    /// of looping.
    pub async fn is_descendant(
        &self,
        owner_id: Uuid,
        candidate_id: Uuid,
        subject_id: Uuid,
    ) -> AppResult<bool> {
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut current = Some(candidate_id);

        while let Some(id) = current {
            if id == subject_id {
                return Ok(true);
            }
            if !visited.insert(id) {
                warn!(folder_id = %candidate_id, repeated = %id, "Cycle detected during descendant walk");
                return Ok(false);
            }
            let Some(folder) = self.folders.find_owned(owner_id, id).await? else {
                return Ok(false);
            };
            current = folder.parent_id;
        }

        Ok(false)
    }

    /// Checks that `parent_id` is a usable attachment point: the root,
    /// or a live folder owned by `owner_id`.
    pub async fn check_parent(&self, owner_id: Uuid, parent_id: Option<Uuid>) -> AppResult<MoveCheck> {
        let Some(pid) = parent_id else {
            return Ok(MoveCheck::Accepted);
        };
        match self.folders.find_by_id(pid).await? {
            None => Ok(MoveCheck::Rejected(MoveRejection::InvalidParent)),
            Some(parent) if parent.owner_id != owner_id => {
                Ok(MoveCheck::Rejected(MoveRejection::NotOwner))
            }
            Some(parent) if parent.is_deleted() => {
                Ok(MoveCheck::Rejected(MoveRejection::InvalidParent))
            }
            Some(_) => Ok(MoveCheck::Accepted),
        }
    }

    /// Full validation for moving folder `subject_id` under
    /// `new_parent_id`: rejects self-parenting, unusable targets, and
    /// any target inside the subject's own subtree.
    pub async fn validate_move_target(
        &self,
        owner_id: Uuid,
        subject_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<MoveCheck> {
        if new_parent_id == Some(subject_id) {
            return Ok(MoveCheck::Rejected(MoveRejection::SelfParent));
        }

        let parent_check = self.check_parent(owner_id, new_parent_id).await?;
        if !parent_check.is_accepted() {
            return Ok(parent_check);
        }

        if let Some(pid) = new_parent_id {
            if self.is_descendant(owner_id, pid, subject_id).await? {
                return Ok(MoveCheck::Rejected(MoveRejection::CyclicMove));
            }
        }

        Ok(MoveCheck::Accepted)
    }
}
