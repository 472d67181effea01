//! Capability traits consumed by the Cumulus engine.

pub mod blob;

pub use blob::BlobStore;
