use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::{ActivityAction, ActivityLogWithRelations};
use crate::shared::types::PaginationQuery;

/// Records and serves the audit trail.
pub struct ActivityService {
    pool: PgPool,
}

impl ActivityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an audited action.
    ///
    /// Best-effort by policy: a failed audit write is logged and swallowed so
    /// it never fails the action it describes.
    pub async fn record(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        document_id: Option<Uuid>,
        details: Option<String>,
        ip_address: Option<String>,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, document_id, action, details, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(document_id)
        .bind(action.as_str())
        .bind(details)
        .bind(ip_address)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                "Failed to record activity {} for user {}: {:?}",
                action.as_str(),
                user_id,
                e
            );
        }
    }

    /// List audit rows, newest first, joined with actor names and the
    /// document name where the document still exists.
    pub async fn list(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ActivityLogWithRelations>, i64)> {
        let rows = sqlx::query_as::<_, ActivityLogWithRelations>(
            r#"
            SELECT a.id, a.user_id, a.document_id, a.action, a.details,
                   a.ip_address, a.created_at,
                   u.name AS user_name, u.email AS user_email,
                   d.original_name AS document_name
            FROM activity_logs a
            JOIN users u ON u.id = a.user_id
            LEFT JOIN documents d ON d.id = a.document_id
            ORDER BY a.created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list activity logs: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count activity logs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }
}
