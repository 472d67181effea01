//! In-memory record-store backend.
//!
//! Implements the repository traits on `dashmap` maps with the same
//! conflict and not-found semantics as the PostgreSQL backend. Used by
//! the service-level tests and by embedders that do not want a database.

pub mod audit;
pub mod file;
pub mod folder;

pub use audit::MemoryAuditSink;
pub use file::MemoryFileRepository;
pub use folder::MemoryFolderRepository;
