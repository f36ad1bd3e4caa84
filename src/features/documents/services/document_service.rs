use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::ActivityAction;
use crate::features::activity::services::ActivityService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    sort_column, sort_direction, DocumentResponseDto, SearchQuery, UpdateDocumentDto,
};
use crate::features::documents::models::{Document, DocumentWithRelations};
use crate::modules::storage::DiskStorage;

const RELATIONS_SELECT: &str = r#"
    SELECT d.id, d.filename, d.original_name, d.file_size, d.file_type,
           d.file_path, d.uploaded_by, d.folder_id, d.created_at,
           u.name AS uploader_name, u.email AS uploader_email,
           f.name AS folder_name
    FROM documents d
    JOIN users u ON u.id = d.uploaded_by
    LEFT JOIN folders f ON f.id = d.folder_id
"#;

/// Document upload, search, download and deletion.
pub struct DocumentService {
    pool: PgPool,
    storage: Arc<DiskStorage>,
    activity: Arc<ActivityService>,
}

impl DocumentService {
    pub fn new(pool: PgPool, storage: Arc<DiskStorage>, activity: Arc<ActivityService>) -> Self {
        Self {
            pool,
            storage,
            activity,
        }
    }

    /// Store an uploaded document. The caller validates size and content
    /// type first, so nothing is written unless the upload is acceptable.
    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        original_name: &str,
        content_type: &str,
        data: &[u8],
        folder_id: Option<Uuid>,
        ip_address: Option<String>,
    ) -> Result<DocumentResponseDto> {
        if let Some(folder_id) = folder_id {
            let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM folders WHERE id = $1")
                .bind(folder_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;
            if exists.is_none() {
                return Err(AppError::NotFound("Folder not found".to_string()));
            }
        }

        let filename = DiskStorage::generate_filename(original_name);
        let file_path = format!("documents/{}", filename);
        self.storage.write(&file_path, data).await?;

        let inserted = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents
                (filename, original_name, file_size, file_type, file_path, uploaded_by, folder_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&filename)
        .bind(original_name)
        .bind(data.len() as i64)
        .bind(content_type)
        .bind(&file_path)
        .bind(user.id)
        .bind(folder_id)
        .fetch_one(&self.pool)
        .await;

        let document = match inserted {
            Ok(document) => document,
            Err(e) => {
                // Keep disk and database consistent when the insert fails.
                self.storage.delete_best_effort(&file_path).await;
                tracing::error!("Failed to insert document row: {:?}", e);
                return Err(AppError::Database(e));
            }
        };

        self.activity
            .record(
                user.id,
                ActivityAction::UploadDocument,
                Some(document.id),
                Some(format!("Uploaded {}", document.original_name)),
                ip_address,
            )
            .await;

        tracing::info!(
            "Document uploaded: id={}, size={}, by={}",
            document.id,
            document.file_size,
            user.id
        );

        self.fetch_with_relations(document.id).await
    }

    /// Search documents with filtering, sorting and pagination.
    ///
    /// Visibility is global for every role; only the dashboard and folder
    /// listings are owner-scoped. The filter clauses are applied identically
    /// to the page and the count.
    pub async fn search(&self, query: &SearchQuery) -> Result<(Vec<DocumentResponseDto>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(RELATIONS_SELECT);
        builder.push(" WHERE 1=1");
        apply_filters(&mut builder, query);
        builder
            .push(" ORDER BY ")
            .push(sort_column(&query.sort_by))
            .push(" ")
            .push(sort_direction(&query.sort_order));

        let pagination = query.pagination();
        builder
            .push(" OFFSET ")
            .push_bind(pagination.offset())
            .push(" LIMIT ")
            .push_bind(pagination.limit());

        let rows = builder
            .build_query_as::<DocumentWithRelations>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Document search failed: {:?}", e);
                AppError::Database(e)
            })?;

        let mut count_builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM documents d JOIN users u ON u.id = d.uploaded_by WHERE 1=1",
        );
        apply_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Document count failed: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((
            rows.into_iter().map(DocumentResponseDto::from).collect(),
            total,
        ))
    }

    /// Fetch a document and its blob for download.
    pub async fn download(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        ip_address: Option<String>,
    ) -> Result<(Document, Vec<u8>)> {
        let document = self.fetch(id).await?;
        let data = self.storage.read(&document.file_path).await?;

        self.activity
            .record(
                user.id,
                ActivityAction::DownloadDocument,
                Some(document.id),
                Some(format!("Downloaded {}", document.original_name)),
                ip_address,
            )
            .await;

        Ok((document, data))
    }

    /// Rename a document and/or move it between folders.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateDocumentDto,
        ip_address: Option<String>,
    ) -> Result<DocumentResponseDto> {
        let before = self.fetch(id).await?;

        let folder_id = match dto.folder_id {
            // Absent: leave unchanged. Some(None): move to the top level.
            None => before.folder_id,
            Some(folder_id) => {
                if let Some(target) = folder_id {
                    let exists: Option<Uuid> =
                        sqlx::query_scalar("SELECT id FROM folders WHERE id = $1")
                            .bind(target)
                            .fetch_optional(&self.pool)
                            .await
                            .map_err(AppError::Database)?;
                    if exists.is_none() {
                        return Err(AppError::NotFound("Folder not found".to_string()));
                    }
                }
                folder_id
            }
        };

        let original_name = dto
            .original_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&before.original_name)
            .to_string();

        let after = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET original_name = $2, folder_id = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&original_name)
        .bind(folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update document {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        self.activity
            .record(
                user.id,
                ActivityAction::UpdateDocument,
                Some(after.id),
                Some(format!("Updated {}", after.original_name)),
                ip_address,
            )
            .await;

        self.fetch_with_relations(after.id).await
    }

    /// Delete a document. Owners may delete their own uploads; anything else
    /// requires SUPER_ADMIN. Audit rows referencing the document keep their
    /// history with the reference nulled by the schema.
    pub async fn delete(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        ip_address: Option<String>,
    ) -> Result<()> {
        let document = self.fetch(id).await?;

        if !user.can_delete_document(document.uploaded_by) {
            return Err(AppError::Forbidden(
                "You can only delete your own documents".to_string(),
            ));
        }

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete document {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        // The row is authoritative; the blob is cleaned up opportunistically.
        self.storage.delete_best_effort(&document.file_path).await;

        self.activity
            .record(
                user.id,
                ActivityAction::DeleteDocument,
                None,
                Some(format!("Deleted {}", document.original_name)),
                ip_address,
            )
            .await;

        Ok(())
    }

    /// Delete several documents atomically: the audit rows that reference
    /// them and the document rows go in one transaction, then blobs are
    /// unlinked best-effort. The route is SUPER_ADMIN-gated.
    pub async fn bulk_delete(
        &self,
        user: &AuthenticatedUser,
        ids: &[Uuid],
        ip_address: Option<String>,
    ) -> Result<u64> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if documents.is_empty() {
            return Err(AppError::NotFound("No documents found".to_string()));
        }

        let found: Vec<Uuid> = documents.iter().map(|d| d.id).collect();

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM activity_logs WHERE document_id = ANY($1)")
            .bind(&found)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let deleted = sqlx::query("DELETE FROM documents WHERE id = ANY($1)")
            .bind(&found)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();
        tx.commit().await.map_err(AppError::Database)?;

        for document in &documents {
            self.storage.delete_best_effort(&document.file_path).await;
        }

        self.activity
            .record(
                user.id,
                ActivityAction::DeleteDocument,
                None,
                Some(format!("Bulk deleted {} documents", deleted)),
                ip_address,
            )
            .await;

        Ok(deleted)
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }

    async fn fetch_with_relations(&self, id: Uuid) -> Result<DocumentResponseDto> {
        let query = format!("{} WHERE d.id = $1", RELATIONS_SELECT);
        let row = sqlx::query_as::<_, DocumentWithRelations>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
        Ok(DocumentResponseDto::from(row))
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &SearchQuery) {
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", q);
        builder
            .push(" AND (d.original_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(file_type) = query
        .file_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        builder
            .push(" AND d.file_type LIKE ")
            .push_bind(format!("{}%", file_type));
    }
    if let Some(folder_id) = query.folder_id {
        builder.push(" AND d.folder_id = ").push_bind(folder_id);
    }
}
