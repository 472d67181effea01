//! File operations: upload with blob-first ordering, metadata rename,
//! compensated moves, soft-delete/restore, sharing, permanent deletion.

pub mod service;

pub use service::FileService;
