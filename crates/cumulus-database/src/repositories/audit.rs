//! PostgreSQL audit log sink implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::audit::model::{AuditLogEntry, CreateAuditLogEntry};

use super::AuditSink;

/// PostgreSQL-backed audit log.
#[derive(Debug, Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Entries for a specific target, newest first.
    pub async fn find_for_target(
        &self,
        target_type: &str,
        target_id: Uuid,
    ) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log \
             WHERE target_type = $1 AND target_id = $2 \
             ORDER BY created_at DESC",
        )
        .bind(target_type)
        .bind(target_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query audit log", e))
    }
}

#[async_trait]
impl AuditSink for PgAuditLogRepository {
    async fn record(&self, entry: &CreateAuditLogEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (actor_id, action, target_type, target_id, details) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.target_type)
        .bind(entry.target_id)
        .bind(&entry.details)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))?;
        Ok(())
    }
}
