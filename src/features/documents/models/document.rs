use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored document. `filename` is the server-generated on-disk name,
/// `original_name` the name the uploader chose, `file_path` the storage key.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub file_path: String,
    pub uploaded_by: Uuid,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Document joined with uploader identity and folder name for listings.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentWithRelations {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub file_path: String,
    pub uploaded_by: Uuid,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub uploader_name: String,
    pub uploader_email: String,
    pub folder_name: Option<String>,
}
