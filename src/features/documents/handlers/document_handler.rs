use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::activity::ip::client_ip;
use crate::features::auth::guards::RequireSuperAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    BulkDeleteDto, DocumentResponseDto, SearchQuery, UpdateDocumentDto,
};
use crate::features::documents::services::DocumentService;
use crate::shared::constants::{ALLOWED_DOCUMENT_TYPES, MAX_DOCUMENT_SIZE};
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::validation::validate_dto;

/// Upload a document
///
/// Accepts multipart/form-data with:
/// - `file`: the document (required)
/// - `folder_id`: target folder UUID (optional)
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "file: document, max 10MB; folder_id: optional UUID"),
    responses(
        (status = 201, description = "Document uploaded", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Missing, oversized or disallowed file"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Folder not found")
    ),
    security(("session_token" = [])),
    tag = "documents"
)]
pub async fn upload_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<DocumentResponseDto>>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut folder_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = Some(ct);
            }
            "folder_id" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read folder_id field: {}", e))
                })?;
                if !text.is_empty() {
                    folder_id = Some(Uuid::parse_str(&text).map_err(|_| {
                        AppError::BadRequest("folder_id must be a valid UUID".to_string())
                    })?);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let name = file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;
    let content_type =
        content_type.ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;

    validate_upload(&content_type, data.len())?;

    let document = service
        .upload(
            &user,
            &name,
            &content_type,
            &data,
            folder_id,
            client_ip(&headers),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(document),
            Some("Document uploaded".to_string()),
            None,
        )),
    ))
}

/// Pre-flight checks for an uploaded document. Both run before the service
/// is called, so nothing touches disk or the database unless they pass.
fn validate_upload(content_type: &str, size: usize) -> Result<()> {
    if !ALLOWED_DOCUMENT_TYPES.contains(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type {} is not allowed",
            content_type
        )));
    }
    if size > MAX_DOCUMENT_SIZE {
        return Err(AppError::BadRequest(
            "File exceeds the 10MB size limit".to_string(),
        ));
    }
    Ok(())
}

/// Search documents
///
/// Supports free-text search, type and folder filters, sorting and
/// pagination. Results span every user's uploads.
#[utoipa::path(
    get,
    path = "/api/documents/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching documents", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = [])),
    tag = "documents"
)]
pub async fn search_documents(
    _user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let (documents, total) = service.search(&query).await?;
    let pagination = query.pagination();
    let meta = Meta::new(total, pagination.page(), pagination.limit());

    Ok(Json(ApiResponse::success(Some(documents), None, Some(meta))))
}

/// Download a document
///
/// Streams the stored blob with the original filename.
#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 404, description = "Document or blob not found")
    ),
    security(("session_token" = [])),
    tag = "documents"
)]
pub async fn download_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response> {
    let (document, data) = service.download(&user, id, client_ip(&headers)).await?;

    let content_type = HeaderValue::from_str(&document.file_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.original_name.replace('"', "")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Update a document
///
/// SUPER_ADMIN only: rename and/or move between folders. Sending
/// `"folder_id": null` moves the document to the top level.
#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = UpdateDocumentDto,
    responses(
        (status = 200, description = "Document updated", body = ApiResponse<DocumentResponseDto>),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "Document or folder not found")
    ),
    security(("session_token" = [])),
    tag = "documents"
)]
pub async fn update_document(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    AppJson(dto): AppJson<UpdateDocumentDto>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    validate_dto(&dto)?;

    let document = service.update(&user, id, dto, client_ip(&headers)).await?;

    Ok(Json(ApiResponse::success(
        Some(document),
        Some("Document updated".to_string()),
        None,
    )))
}

/// Delete a document
///
/// Owners may delete their own uploads; SUPER_ADMIN may delete any.
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted", body = ApiResponse<String>),
        (status = 403, description = "Not your document"),
        (status = 404, description = "Document not found")
    ),
    security(("session_token" = [])),
    tag = "documents"
)]
pub async fn delete_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>> {
    service.delete(&user, id, client_ip(&headers)).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Document deleted".to_string()),
        None,
    )))
}

/// Delete several documents at once
///
/// SUPER_ADMIN only.
#[utoipa::path(
    post,
    path = "/api/documents/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Documents deleted", body = ApiResponse<String>),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "No matching documents")
    ),
    security(("session_token" = [])),
    tag = "documents"
)]
pub async fn bulk_delete(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(service): State<Arc<DocumentService>>,
    headers: HeaderMap,
    AppJson(dto): AppJson<BulkDeleteDto>,
) -> Result<Json<ApiResponse<String>>> {
    validate_dto(&dto)?;

    let deleted = service
        .bulk_delete(&user, &dto.ids, client_ip(&headers))
        .await?;

    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Deleted {} documents", deleted)),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disallowed_mime_types_are_rejected_up_front() {
        assert!(matches!(
            validate_upload("application/x-msdownload", 100),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_upload("application/octet-stream", 100),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_upload("application/pdf", 100).is_ok());
        assert!(validate_upload("image/png", 100).is_ok());
    }

    #[test]
    fn oversized_uploads_are_rejected_up_front() {
        assert!(matches!(
            validate_upload("application/pdf", MAX_DOCUMENT_SIZE + 1),
            Err(AppError::BadRequest(_))
        ));
        // The limit itself is still acceptable
        assert!(validate_upload("application/pdf", MAX_DOCUMENT_SIZE).is_ok());
    }
}
