use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{AuthUserDto, LoginRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use crate::shared::validation::validate_dto;

/// Log in with email and password
///
/// On success the session token is set as an HTTP-only cookie; the body
/// carries the authenticated user.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthUserDto>),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account is inactive"),
        (status = 400, description = "Validation error")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<(HeaderMap, Json<ApiResponse<AuthUserDto>>)> {
    validate_dto(&dto)?;

    let (token, user) = service.login(&dto.email, &dto.password).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, service.session_cookie(&token));

    Ok((
        headers,
        Json(ApiResponse::success(
            Some(user),
            Some("Login successful".to_string()),
            None,
        )),
    ))
}

/// Log out
///
/// Clears the session cookie. Always succeeds, authenticated or not.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<String>)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
) -> (HeaderMap, Json<ApiResponse<String>>) {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, service.clear_cookie());

    (
        headers,
        Json(ApiResponse::success(
            None,
            Some("Logged out".to_string()),
            None,
        )),
    )
}

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<AuthenticatedUser>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = [])),
    tag = "auth"
)]
pub async fn get_me(user: AuthenticatedUser) -> Json<ApiResponse<AuthenticatedUser>> {
    Json(ApiResponse::success(Some(user), None, None))
}
