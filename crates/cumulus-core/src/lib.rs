//! # cumulus-core
//!
//! Core crate for Cumulus. Contains the blob-store capability trait,
//! configuration schemas, tracing setup, the shared move/cascade/batch
//! result types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Cumulus crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
