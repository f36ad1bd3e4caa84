use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A user-owned folder grouping documents.
#[derive(Debug, Clone, FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Folder joined with owner identity and document count for listings.
#[derive(Debug, Clone, FromRow)]
pub struct FolderWithMeta {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub owner_name: String,
    pub owner_email: String,
    pub document_count: i64,
}
