use std::collections::HashSet;
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::models::Document;
use crate::features::folders::dtos::FolderResponseDto;
use crate::features::folders::models::{Folder, FolderWithMeta};
use crate::modules::archive::{
    build_zip, sanitize_archive_stem, sanitize_entry_name, unique_entry_name,
};
use crate::modules::storage::DiskStorage;

const META_SELECT: &str = r#"
    SELECT f.id, f.name, f.user_id, f.created_at,
           u.name AS owner_name, u.email AS owner_email,
           COALESCE(d.cnt, 0) AS document_count
    FROM folders f
    JOIN users u ON u.id = f.user_id
    LEFT JOIN (
        SELECT folder_id, COUNT(*) AS cnt
        FROM documents
        GROUP BY folder_id
    ) d ON d.folder_id = f.id
"#;

/// Folder management and folder-level zip downloads.
pub struct FolderService {
    pool: PgPool,
    storage: Arc<DiskStorage>,
}

impl FolderService {
    pub fn new(pool: PgPool, storage: Arc<DiskStorage>) -> Self {
        Self { pool, storage }
    }

    /// List folders with owner and document counts. Non-SUPER_ADMIN callers
    /// only see their own folders.
    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<FolderResponseDto>> {
        let rows = if user.sees_all() {
            let query = format!("{} ORDER BY f.created_at DESC", META_SELECT);
            sqlx::query_as::<_, FolderWithMeta>(&query)
                .fetch_all(&self.pool)
                .await
        } else {
            let query = format!(
                "{} WHERE f.user_id = $1 ORDER BY f.created_at DESC",
                META_SELECT
            );
            sqlx::query_as::<_, FolderWithMeta>(&query)
                .bind(user.id)
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| {
            tracing::error!("Failed to list folders: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(FolderResponseDto::from).collect())
    }

    /// Create a folder owned by the caller. Names are unique per owner,
    /// case-insensitive; the unique index is the authoritative check.
    pub async fn create(&self, user: &AuthenticatedUser, name: &str) -> Result<FolderResponseDto> {
        let name = name.trim();

        let folder = sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO folders (name, user_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::Database(e);
            if err.is_unique_violation() {
                AppError::Conflict("Folder with this name already exists".to_string())
            } else {
                tracing::error!("Failed to create folder: {:?}", err);
                err
            }
        })?;

        self.fetch_with_meta(folder.id).await
    }

    /// Rename a folder, keeping the per-owner uniqueness rule.
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<FolderResponseDto> {
        let name = name.trim();
        let folder = self.fetch(id).await?;

        let updated = sqlx::query_as::<_, Folder>(
            r#"
            UPDATE folders SET name = $2 WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(folder.id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::Database(e);
            if err.is_unique_violation() {
                AppError::Conflict("Folder with this name already exists".to_string())
            } else {
                tracing::error!("Failed to rename folder {}: {:?}", id, err);
                err
            }
        })?;

        self.fetch_with_meta(updated.id).await
    }

    /// Delete a folder and everything in it: the audit rows referencing its
    /// documents, the documents and the folder itself go in one transaction,
    /// then blobs are unlinked best-effort.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let folder = self.fetch(id).await?;

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE folder_id = $1",
        )
        .bind(folder.id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let doc_ids: Vec<Uuid> = documents.iter().map(|d| d.id).collect();

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        if !doc_ids.is_empty() {
            sqlx::query("DELETE FROM activity_logs WHERE document_id = ANY($1)")
                .bind(&doc_ids)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            sqlx::query("DELETE FROM documents WHERE id = ANY($1)")
                .bind(&doc_ids)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }
        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(folder.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;

        for document in &documents {
            self.storage.delete_best_effort(&document.file_path).await;
        }

        tracing::info!(
            "Folder deleted: id={}, documents={}",
            folder.id,
            documents.len()
        );

        Ok(())
    }

    /// Build a zip of a folder's documents, named after the folder.
    ///
    /// Documents whose blob has gone missing are skipped with a warning; an
    /// empty folder still yields a valid archive with a placeholder entry.
    pub async fn download_zip(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(String, Vec<u8>)> {
        let folder = self.fetch(id).await?;

        if !user.sees_all() && folder.user_id != user.id {
            return Err(AppError::Forbidden(
                "You do not have access to this folder".to_string(),
            ));
        }

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE folder_id = $1 ORDER BY created_at",
        )
        .bind(folder.id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(documents.len());
        // Several documents may share a display name; each zip entry still
        // needs its own.
        let mut taken = HashSet::new();
        for document in &documents {
            match self.storage.read(&document.file_path).await {
                Ok(data) => {
                    let entry = sanitize_entry_name(&document.original_name, &document.filename);
                    entries.push((unique_entry_name(&entry, &mut taken), data));
                }
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(
                        "Skipping document {} in zip: blob {} missing",
                        document.id,
                        document.file_path
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if entries.is_empty() {
            entries.push((
                "README.txt".to_string(),
                format!("Folder \"{}\" has no documents.\n", folder.name).into_bytes(),
            ));
        }

        let archive = build_zip(&entries)?;
        let archive_name = format!("{}.zip", sanitize_archive_stem(&folder.name));

        Ok((archive_name, archive))
    }

    async fn fetch(&self, id: Uuid) -> Result<Folder> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))
    }

    async fn fetch_with_meta(&self, id: Uuid) -> Result<FolderResponseDto> {
        let query = format!("{} WHERE f.id = $1", META_SELECT);
        let row = sqlx::query_as::<_, FolderWithMeta>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;
        Ok(FolderResponseDto::from(row))
    }
}
