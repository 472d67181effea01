//! Folder operations: creation with naming retry, validated moves with
//! cascade resync, soft-delete/restore, sharing, permanent deletion.

pub mod service;

pub use service::{FolderMoveOutcome, FolderService};
