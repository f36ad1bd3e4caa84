use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::activity::dtos::ActivityResponseDto;
use crate::features::activity::models::ActivityLogWithRelations;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::{DashboardStatsDto, FileTypeCountDto};
use crate::features::documents::dtos::DocumentResponseDto;
use crate::features::documents::models::DocumentWithRelations;

const RECENT_DOCUMENTS: usize = 5;
const RECENT_ACTIVITY: usize = 10;

#[derive(FromRow)]
struct TypeCountRow {
    file_type: String,
    count: i64,
}

/// Aggregates the dashboard page in one call. Every document-derived figure
/// is owner-scoped for non-SUPER_ADMIN callers.
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self, user: &AuthenticatedUser) -> Result<DashboardStatsDto> {
        let scope_all = user.sees_all();

        let (documents_count, storage_bytes): (i64, i64) = if scope_all {
            sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(file_size), 0)::BIGINT FROM documents",
            )
            .fetch_one(&self.pool)
            .await
        } else {
            sqlx::query_as(
                r#"
                SELECT COUNT(*), COALESCE(SUM(file_size), 0)::BIGINT
                FROM documents WHERE uploaded_by = $1
                "#,
            )
            .bind(user.id)
            .fetch_one(&self.pool)
            .await
        }
        .map_err(|e| {
            tracing::error!("Failed to aggregate document stats: {:?}", e);
            AppError::Database(e)
        })?;

        // The user count and the activity feed expose other users' actions,
        // so only SUPER_ADMIN gets them.
        let total_users: Option<i64> = if scope_all {
            Some(
                sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(AppError::Database)?,
            )
        } else {
            None
        };

        let recent_documents = self.recent_documents(user, scope_all).await?;
        let documents_by_type = self.documents_by_type(user, scope_all).await?;
        let recent_activity = if scope_all {
            self.recent_activity().await?
        } else {
            Vec::new()
        };

        Ok(DashboardStatsDto {
            documents_count,
            total_users,
            storage_used: format_file_size(storage_bytes),
            storage_bytes,
            recent_documents,
            documents_by_type,
            recent_activity,
        })
    }

    async fn recent_documents(
        &self,
        user: &AuthenticatedUser,
        scope_all: bool,
    ) -> Result<Vec<DocumentResponseDto>> {
        let base = r#"
            SELECT d.id, d.filename, d.original_name, d.file_size, d.file_type,
                   d.file_path, d.uploaded_by, d.folder_id, d.created_at,
                   u.name AS uploader_name, u.email AS uploader_email,
                   f.name AS folder_name
            FROM documents d
            JOIN users u ON u.id = d.uploaded_by
            LEFT JOIN folders f ON f.id = d.folder_id
        "#;

        let rows = if scope_all {
            let query = format!("{} ORDER BY d.created_at DESC LIMIT $1", base);
            sqlx::query_as::<_, DocumentWithRelations>(&query)
                .bind(RECENT_DOCUMENTS as i64)
                .fetch_all(&self.pool)
                .await
        } else {
            let query = format!(
                "{} WHERE d.uploaded_by = $1 ORDER BY d.created_at DESC LIMIT $2",
                base
            );
            sqlx::query_as::<_, DocumentWithRelations>(&query)
                .bind(user.id)
                .bind(RECENT_DOCUMENTS as i64)
                .fetch_all(&self.pool)
                .await
        }
        .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(DocumentResponseDto::from).collect())
    }

    async fn documents_by_type(
        &self,
        user: &AuthenticatedUser,
        scope_all: bool,
    ) -> Result<Vec<FileTypeCountDto>> {
        let rows = if scope_all {
            sqlx::query_as::<_, TypeCountRow>(
                r#"
                SELECT file_type, COUNT(*) AS count
                FROM documents GROUP BY file_type ORDER BY count DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, TypeCountRow>(
                r#"
                SELECT file_type, COUNT(*) AS count
                FROM documents WHERE uploaded_by = $1
                GROUP BY file_type ORDER BY count DESC
                "#,
            )
            .bind(user.id)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(AppError::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| FileTypeCountDto {
                file_type: r.file_type,
                count: r.count,
            })
            .collect())
    }

    async fn recent_activity(&self) -> Result<Vec<ActivityResponseDto>> {
        let rows = sqlx::query_as::<_, ActivityLogWithRelations>(
            r#"
            SELECT a.id, a.user_id, a.document_id, a.action, a.details,
                   a.ip_address, a.created_at,
                   u.name AS user_name, u.email AS user_email,
                   d.original_name AS document_name
            FROM activity_logs a
            JOIN users u ON u.id = a.user_id
            LEFT JOIN documents d ON d.id = a.document_id
            ORDER BY a.created_at DESC LIMIT $1
            "#,
        )
        .bind(RECENT_ACTIVITY as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(ActivityResponseDto::from).collect())
    }
}

/// Render a byte count the way the dashboard displays it.
pub fn format_file_size(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes <= 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_byte_counts_per_unit() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(-5), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
