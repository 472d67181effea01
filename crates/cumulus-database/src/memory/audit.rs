//! In-memory audit sink.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use cumulus_core::result::AppResult;
use cumulus_entity::audit::model::{AuditLogEntry, CreateAuditLogEntry};

use crate::repositories::AuditSink;

/// In-memory [`AuditSink`] collecting entries in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, entry: &CreateAuditLogEntry) -> AppResult<()> {
        let full = AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            action: entry.action.clone(),
            target_type: entry.target_type.clone(),
            target_id: entry.target_id,
            details: entry.details.clone(),
            created_at: Utc::now(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(full);
        }
        Ok(())
    }
}
