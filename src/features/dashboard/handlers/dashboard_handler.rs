use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::DashboardStatsDto;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Dashboard statistics
///
/// Document figures are owner-scoped for non-admin callers; the user count
/// and activity feed are returned for SUPER_ADMIN only.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = ApiResponse<DashboardStatsDto>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    user: AuthenticatedUser,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardStatsDto>>> {
    let stats = service.stats(&user).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
