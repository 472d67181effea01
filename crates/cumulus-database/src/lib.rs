//! # cumulus-database
//!
//! Record-store capability traits for the Cumulus hierarchy engine,
//! their PostgreSQL implementations, connection pool management, and an
//! in-memory backend for tests and embedded use.

pub mod connection;
pub mod memory;
pub mod repositories;

pub use connection::PgBackend;
pub use repositories::{AuditSink, FileRepository, FolderRepository};
