use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::activity::dtos::ActivityResponseDto;
use crate::features::activity::services::ActivityService;
use crate::features::auth::guards::RequireSuperAdmin;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List the audit trail (monitoring)
///
/// SUPER_ADMIN only. Newest first.
#[utoipa::path(
    get,
    path = "/api/activity",
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Audit rows", body = ApiResponse<Vec<ActivityResponseDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Super admin access required")
    ),
    security(("session_token" = [])),
    tag = "activity"
)]
pub async fn list_activity(
    State(service): State<Arc<ActivityService>>,
    RequireSuperAdmin(_user): RequireSuperAdmin,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityResponseDto>>>> {
    let (rows, total) = service.list(&pagination).await?;
    let meta = Meta::new(total, pagination.page(), pagination.limit());
    let items = rows.into_iter().map(ActivityResponseDto::from).collect();

    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}
