use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::activity::dtos::ActivityResponseDto;
use crate::features::documents::dtos::DocumentResponseDto;

/// Documents aggregated by MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileTypeCountDto {
    pub file_type: String,
    pub count: i64,
}

/// Everything the dashboard page renders in one response.
///
/// `total_users` and `recent_activity` are populated for SUPER_ADMIN only;
/// other roles get their own document figures without the global fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsDto {
    pub documents_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
    /// Human-readable total, e.g. "4.2 MB"
    pub storage_used: String,
    pub storage_bytes: i64,
    pub recent_documents: Vec<DocumentResponseDto>,
    pub documents_by_type: Vec<FileTypeCountDto>,
    pub recent_activity: Vec<ActivityResponseDto>,
}
