//! In-memory blob store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::traits::blob::BlobStore;

/// In-memory blob store backed by a `DashMap`.
///
/// Used by tests and embedded setups. Counts physical moves and carries
/// a failure switch so tests can exercise the engine's compensation and
/// partial-failure paths.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
    base_url: String,
    rename_count: AtomicU64,
    rename_attempts: AtomicU64,
    fail_renames_matching: Mutex<Option<String>>,
    fail_rename_attempt: AtomicU64,
    fail_next_remove: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty in-memory store.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Total number of successful physical moves performed.
    pub fn rename_count(&self) -> u64 {
        self.rename_count.load(Ordering::SeqCst)
    }

    /// Make every `rename` whose source or target contains `fragment`
    /// fail with a storage error until cleared with `None`.
    pub fn fail_renames_matching(&self, fragment: Option<&str>) {
        if let Ok(mut guard) = self.fail_renames_matching.lock() {
            *guard = fragment.map(str::to_string);
        }
    }

    /// Make the `n`-th `rename` attempt from now (1-based, successful or
    /// not) fail with a storage error. One-shot.
    pub fn fail_rename_attempt(&self, n: u64) {
        self.rename_attempts.store(0, Ordering::SeqCst);
        self.fail_rename_attempt.store(n, Ordering::SeqCst);
    }

    /// Make the next `remove` call fail with a storage error. One-shot.
    pub fn fail_next_remove(&self) {
        self.fail_next_remove.store(true, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.blobs.insert(key.to_string(), data);
        Ok(())
    }

    async fn read_bytes(&self, key: &str) -> AppResult<Bytes> {
        self.blobs
            .get(key)
            .map(|b| b.clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let attempt = self.rename_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .fail_rename_attempt
            .compare_exchange(attempt, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return Err(AppError::storage(format!(
                "Injected rename failure: {from} -> {to}"
            )));
        }

        if let Ok(guard) = self.fail_renames_matching.lock() {
            if let Some(fragment) = guard.as_deref() {
                if from.contains(fragment) || to.contains(fragment) {
                    return Err(AppError::storage(format!(
                        "Injected rename failure: {from} -> {to}"
                    )));
                }
            }
        }

        let (_, data) = self
            .blobs
            .remove(from)
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {from}")))?;
        self.blobs.insert(to.to_string(), data);
        self.rename_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        if self.fail_next_remove.swap(false, Ordering::SeqCst) {
            return Err(AppError::storage(format!("Injected remove failure: {key}")));
        }

        self.blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_core::error::ErrorKind;

    #[tokio::test]
    async fn test_rename_counts_moves() {
        let store = MemoryBlobStore::new("http://test");
        store.put("a", Bytes::from("1")).await.unwrap();
        store.rename("a", "b").await.unwrap();
        assert_eq!(store.rename_count(), 1);
        assert_eq!(store.read_bytes("b").await.unwrap(), "1");
    }

    #[tokio::test]
    async fn test_injected_rename_failure() {
        let store = MemoryBlobStore::new("http://test");
        store.put("x/doc.pdf", Bytes::from("1")).await.unwrap();
        store.fail_renames_matching(Some("doc"));

        let err = store.rename("x/doc.pdf", "y/doc.pdf").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);

        store.fail_renames_matching(None);
        store.rename("x/doc.pdf", "y/doc.pdf").await.unwrap();
    }
}
