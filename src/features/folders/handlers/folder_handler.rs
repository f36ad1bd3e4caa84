use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireSuperAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::folders::dtos::{CreateFolderDto, FolderResponseDto, UpdateFolderDto};
use crate::features::folders::services::FolderService;
use crate::shared::types::ApiResponse;
use crate::shared::validation::validate_dto;

/// List folders
///
/// Non-admin callers only see their own folders.
#[utoipa::path(
    get,
    path = "/api/folders",
    responses(
        (status = 200, description = "Folders", body = ApiResponse<Vec<FolderResponseDto>>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = [])),
    tag = "folders"
)]
pub async fn list_folders(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
) -> Result<Json<ApiResponse<Vec<FolderResponseDto>>>> {
    let folders = service.list(&user).await?;
    Ok(Json(ApiResponse::success(Some(folders), None, None)))
}

/// Create a folder
#[utoipa::path(
    post,
    path = "/api/folders",
    request_body = CreateFolderDto,
    responses(
        (status = 201, description = "Folder created", body = ApiResponse<FolderResponseDto>),
        (status = 409, description = "Folder name already in use")
    ),
    security(("session_token" = [])),
    tag = "folders"
)]
pub async fn create_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppJson(dto): AppJson<CreateFolderDto>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponseDto>>)> {
    validate_dto(&dto)?;

    let folder = service.create(&user, &dto.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(folder),
            Some("Folder created".to_string()),
            None,
        )),
    ))
}

/// Rename a folder
///
/// SUPER_ADMIN only.
#[utoipa::path(
    put,
    path = "/api/folders/{id}",
    params(("id" = Uuid, Path, description = "Folder id")),
    request_body = UpdateFolderDto,
    responses(
        (status = 200, description = "Folder renamed", body = ApiResponse<FolderResponseDto>),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "Folder not found"),
        (status = 409, description = "Folder name already in use")
    ),
    security(("session_token" = [])),
    tag = "folders"
)]
pub async fn update_folder(
    RequireSuperAdmin(_user): RequireSuperAdmin,
    State(service): State<Arc<FolderService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateFolderDto>,
) -> Result<Json<ApiResponse<FolderResponseDto>>> {
    validate_dto(&dto)?;

    let folder = service.rename(id, &dto.name).await?;

    Ok(Json(ApiResponse::success(
        Some(folder),
        Some("Folder renamed".to_string()),
        None,
    )))
}

/// Delete a folder and its documents
///
/// SUPER_ADMIN only.
#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    params(("id" = Uuid, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Folder deleted", body = ApiResponse<String>),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "Folder not found")
    ),
    security(("session_token" = [])),
    tag = "folders"
)]
pub async fn delete_folder(
    RequireSuperAdmin(_user): RequireSuperAdmin,
    State(service): State<Arc<FolderService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<String>>> {
    service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Folder deleted".to_string()),
        None,
    )))
}

/// Download a folder as a zip archive
#[utoipa::path(
    get,
    path = "/api/folders/{id}/download",
    params(("id" = Uuid, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Zip archive"),
        (status = 403, description = "Not your folder"),
        (status = 404, description = "Folder not found")
    ),
    security(("session_token" = [])),
    tag = "folders"
)]
pub async fn download_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let (archive_name, archive) = service.download_zip(&user, id).await?;

    let disposition = format!("attachment; filename=\"{}\"", archive_name);
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/zip"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}
