//! Result types for move validation, cascade resync, and batch moves.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Why a move target was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MoveRejection {
    /// The target parent is the subject itself.
    #[error("a folder cannot be its own parent")]
    SelfParent,
    /// The target parent does not exist or is soft-deleted.
    #[error("target parent folder does not exist or is deleted")]
    InvalidParent,
    /// The target parent belongs to a different owner.
    #[error("target parent folder belongs to another user")]
    NotOwner,
    /// The target parent is a descendant of the subject.
    #[error("cannot move a folder into one of its own descendants")]
    CyclicMove,
    /// The subject itself was not found for the acting owner.
    #[error("folder not found")]
    NotFound,
}

/// Outcome of validating a move target.
///
/// Database failures during validation surface as errors; rejections are
/// ordinary values so callers can inspect the reason without string
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCheck {
    /// The move is allowed.
    Accepted,
    /// The move is not allowed.
    Rejected(MoveRejection),
}

impl MoveCheck {
    /// Returns `true` if the check accepted the move.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Converts an accepted check into `Ok(())` and a rejection into the
    /// corresponding [`AppError`].
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(reason) => Err(reason.into()),
        }
    }
}

impl From<MoveRejection> for AppError {
    fn from(rejection: MoveRejection) -> Self {
        match rejection {
            MoveRejection::NotFound => AppError::not_found(rejection.to_string()),
            MoveRejection::NotOwner => AppError::authorization(rejection.to_string()),
            MoveRejection::SelfParent | MoveRejection::InvalidParent | MoveRejection::CyclicMove => {
                AppError::validation(rejection.to_string())
            }
        }
    }
}

/// A single file that could not be resynced during a cascade.
#[derive(Debug, Clone)]
pub struct CascadeFailure {
    /// The file whose storage key could not be brought up to date.
    pub file_id: Uuid,
    /// What went wrong.
    pub error: AppError,
}

/// Outcome of propagating a folder move into the storage keys of every
/// file in the affected subtree.
///
/// The cascade is not transactional: files already relocated stay
/// relocated even when later files fail. Re-running the resync is
/// idempotent, so `failures` is a retry worklist rather than a rollback
/// signal.
#[derive(Debug, Clone, Default)]
pub struct CascadeReport {
    /// Files whose blobs were physically relocated.
    pub relocated: Vec<Uuid>,
    /// Files inspected whose stored key was already correct.
    pub unchanged: u64,
    /// Files that could not be resynced.
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// Returns `true` when every file in the subtree was brought up to date.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reference to a movable item in a batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemRef {
    /// A folder, moved with its whole subtree.
    Folder(Uuid),
    /// A single file.
    File(Uuid),
}

impl ItemRef {
    /// The referenced item's ID.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Folder(id) | Self::File(id) => *id,
        }
    }
}

/// A single item that failed during a batch move.
#[derive(Debug, Clone)]
pub struct BatchMoveError {
    /// The item that failed.
    pub item: ItemRef,
    /// Why it failed.
    pub error: AppError,
}

/// Outcome of a batch move: per-item successes and failures.
///
/// One item's failure never blocks or rolls back the others.
#[derive(Debug, Clone, Default)]
pub struct BatchMoveReport {
    /// Items that moved successfully.
    pub moved: Vec<ItemRef>,
    /// Items that failed, with the reason.
    pub errors: Vec<BatchMoveError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_rejection_maps_to_error_kind() {
        let err: AppError = MoveRejection::CyclicMove.into();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err: AppError = MoveRejection::NotOwner.into();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err: AppError = MoveRejection::NotFound.into();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_move_check_into_result() {
        assert!(MoveCheck::Accepted.into_result().is_ok());
        let err = MoveCheck::Rejected(MoveRejection::SelfParent)
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
