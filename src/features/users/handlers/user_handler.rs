use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::activity::ip::client_ip;
use crate::features::auth::guards::RequireSuperAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::features::users::dtos::{CreateUserDto, UpdateUserDto, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::constants::{ALLOWED_AVATAR_TYPES, MAX_AVATAR_SIZE};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};
use crate::shared::validation::validate_dto;

#[derive(Clone)]
pub struct UserHandlerState {
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
}

/// List users
///
/// SUPER_ADMIN only. Includes creator name and upload counts.
#[utoipa::path(
    get,
    path = "/api/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "Super admin access required")
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    RequireSuperAdmin(_user): RequireSuperAdmin,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, total) = state.users.list(&pagination).await?;
    let meta = Meta::new(total, pagination.page(), pagination.limit());
    Ok(Json(ApiResponse::success(Some(users), None, Some(meta))))
}

/// Create a user
///
/// SUPER_ADMIN only.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Super admin access required"),
        (status = 409, description = "Email already in use"),
        (status = 400, description = "Validation error")
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    RequireSuperAdmin(actor): RequireSuperAdmin,
    headers: HeaderMap,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    validate_dto(&dto)?;

    let user = state.users.create(&actor, dto, client_ip(&headers)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user),
            Some("User created".to_string()),
            None,
        )),
    ))
}

/// Update a user
///
/// SUPER_ADMIN only. An admin cannot change their own role or deactivate
/// their own account.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Self-protection violation"),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    RequireSuperAdmin(actor): RequireSuperAdmin,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    validate_dto(&dto)?;

    let user = state
        .users
        .update(&actor, id, dto, client_ip(&headers))
        .await?;

    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User updated".to_string()),
        None,
    )))
}

/// Pre-flight checks for an uploaded avatar. Both run before the service is
/// called, so nothing touches disk or the database unless they pass.
fn validate_avatar(content_type: &str, size: usize) -> Result<()> {
    if !ALLOWED_AVATAR_TYPES.contains(&content_type) {
        return Err(AppError::BadRequest(
            "Avatar must be an image (png, jpeg, gif or webp)".to_string(),
        ));
    }
    if size > MAX_AVATAR_SIZE {
        return Err(AppError::BadRequest(
            "Avatar exceeds the 3MB size limit".to_string(),
        ));
    }
    Ok(())
}

/// Upload a profile avatar
///
/// Accepts multipart/form-data with a single `avatar` image field. On
/// success the session cookie is re-issued so the new avatar URL travels in
/// the token.
#[utoipa::path(
    post,
    path = "/api/profile/avatar",
    request_body(content_type = "multipart/form-data", description = "avatar: image file, max 3MB"),
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<AuthenticatedUser>),
        (status = 400, description = "Missing, oversized or non-image file"),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn update_avatar(
    user: AuthenticatedUser,
    State(state): State<UserHandlerState>,
    mut multipart: Multipart,
) -> Result<(HeaderMap, Json<ApiResponse<AuthenticatedUser>>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "avatar" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "avatar".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read avatar bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = Some(ct);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("Avatar file is required".to_string()))?;
    let name = file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;
    let content_type =
        content_type.ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;

    validate_avatar(&content_type, data.len())?;

    let (token, refreshed) = state.users.update_avatar(&user, &name, &data).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, state.auth.session_cookie(&token));

    Ok((
        headers,
        Json(ApiResponse::success(
            Some(refreshed),
            Some("Avatar updated".to_string()),
            None,
        )),
    ))
}
