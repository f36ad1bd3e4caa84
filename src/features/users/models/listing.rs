use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::users::models::Role;

/// User row joined with its creator's name and the number of documents the
/// user has uploaded, as served to the user management page.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithMeta {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by_name: Option<String>,
    pub document_count: i64,
}
