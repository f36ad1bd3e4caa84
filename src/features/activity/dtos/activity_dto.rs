use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::activity::models::ActivityLogWithRelations;

/// Audit row as served to the monitoring page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponseDto {
    pub id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub document_id: Option<Uuid>,
    /// None when the referenced document has since been deleted.
    pub document_name: Option<String>,
}

impl From<ActivityLogWithRelations> for ActivityResponseDto {
    fn from(a: ActivityLogWithRelations) -> Self {
        Self {
            id: a.id,
            action: a.action,
            details: a.details,
            ip_address: a.ip_address,
            created_at: a.created_at,
            user_id: a.user_id,
            user_name: a.user_name,
            user_email: a.user_email,
            document_id: a.document_id,
            document_name: a.document_name,
        }
    }
}
