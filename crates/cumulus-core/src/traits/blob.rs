//! Blob store trait for pluggable object-storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for object-storage backends holding file bytes.
///
/// Keys are path-like strings derived from an owner's logical folder
/// tree. Implementations exist for the local filesystem, an in-memory
/// map, and S3. The trait is defined here in `cumulus-core` and
/// implemented in `cumulus-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Write bytes at the given key, replacing any existing blob.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Read the complete blob stored at the given key.
    async fn read_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Move a blob from one key to another.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Delete the blob at the given key.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given key.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// A URL under which the blob can be fetched by a client.
    fn public_url(&self, key: &str) -> String;
}
