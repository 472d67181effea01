//! Shared value types used across the Cumulus crates.

pub mod moves;

pub use moves::{
    BatchMoveError, BatchMoveReport, CascadeFailure, CascadeReport, ItemRef, MoveCheck,
    MoveRejection,
};
