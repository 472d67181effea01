//! Business logic for the Cumulus folder/file hierarchy.
//!
//! This crate holds the services that keep the logical tree (folder and
//! file records) and the physical blob namespace in agreement:
//!
//! - [`path::PathResolver`] turns folder ids into slash-joined logical
//!   paths and derives the storage keys blobs live under.
//! - [`tree::TreeInvariantChecker`] validates move targets so the
//!   forest never gains a cycle or a dangling parent.
//! - [`folder::FolderService`] and [`file::FileService`] implement the
//!   user-facing operations, including the blob-first move protocol and
//!   the subtree resync cascade.
//! - [`batch::BatchMoveCoordinator`] applies a mixed batch of moves
//!   item by item and reports per-item outcomes.

pub mod batch;
pub mod file;
pub mod folder;
pub mod path;
pub mod tree;

pub use batch::BatchMoveCoordinator;
pub use file::FileService;
pub use folder::{FolderMoveOutcome, FolderService};
pub use path::PathResolver;
pub use tree::TreeInvariantChecker;
