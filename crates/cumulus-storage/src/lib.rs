//! # cumulus-storage
//!
//! Blob store implementations for Cumulus. Supports the local
//! filesystem, an in-memory map, and (feature `s3`) S3-compatible
//! object stores.

use std::sync::Arc;

use cumulus_core::config::storage::StorageConfig;
use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::traits::blob::BlobStore;

pub mod providers;

pub use providers::local::LocalBlobStore;
pub use providers::memory::MemoryBlobStore;
#[cfg(feature = "s3")]
pub use providers::s3::S3BlobStore;

/// Build the blob store selected by configuration.
pub async fn build_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    match config.provider.as_str() {
        "local" => Ok(Arc::new(
            LocalBlobStore::new(&config.local.root_path, &config.public_base_url).await?,
        )),
        "memory" => Ok(Arc::new(MemoryBlobStore::new(&config.public_base_url))),
        #[cfg(feature = "s3")]
        "s3" => Ok(Arc::new(
            S3BlobStore::new(&config.s3, &config.public_base_url).await?,
        )),
        other => Err(AppError::configuration(format!(
            "Unknown blob store provider '{other}'"
        ))),
    }
}
