use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::documents::models::DocumentWithRelations;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::not_blank;

/// Query parameters for document search.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free-text match against document name and uploader name
    pub q: Option<String>,
    /// MIME type prefix filter, e.g. "image" or "application/pdf"
    pub file_type: Option<String>,
    /// Restrict to a single folder
    pub folder_id: Option<Uuid>,
    /// Sort column: created_at, original_name, file_size or file_type
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort direction: asc or desc
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_sort_by() -> String {
    "created_at".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl SearchQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Map a requested sort column onto the allow-list. Anything unknown falls
/// back to the upload timestamp; column names are never interpolated from
/// raw input.
pub fn sort_column(requested: &str) -> &'static str {
    match requested {
        "original_name" | "name" => "d.original_name",
        "file_size" | "size" => "d.file_size",
        "file_type" | "type" => "d.file_type",
        _ => "d.created_at",
    }
}

pub fn sort_direction(requested: &str) -> &'static str {
    if requested.eq_ignore_ascii_case("asc") {
        "ASC"
    } else {
        "DESC"
    }
}

/// Request body for updating a document.
///
/// `folder_id` distinguishes "absent" (leave unchanged) from explicit `null`
/// (move to the top level), hence the double Option.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentDto {
    #[validate(custom(function = not_blank))]
    pub original_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub folder_id: Option<Option<Uuid>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Request body for bulk delete.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkDeleteDto {
    #[validate(length(min = 1, message = "must contain at least one id"))]
    pub ids: Vec<Uuid>,
}

/// Document as served to listings and search results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub folder_id: Option<Uuid>,
    pub folder_name: Option<String>,
    pub uploaded_by: Uuid,
    pub uploader_name: String,
    pub uploader_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<DocumentWithRelations> for DocumentResponseDto {
    fn from(d: DocumentWithRelations) -> Self {
        Self {
            id: d.id,
            original_name: d.original_name,
            file_size: d.file_size,
            file_type: d.file_type,
            folder_id: d.folder_id,
            folder_name: d.folder_name,
            uploaded_by: d.uploaded_by,
            uploader_name: d.uploader_name,
            uploader_email: d.uploader_email,
            created_at: d.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_columns_fall_back_to_created_at() {
        assert_eq!(sort_column("created_at"), "d.created_at");
        assert_eq!(sort_column("original_name"), "d.original_name");
        assert_eq!(sort_column("file_size"), "d.file_size");
        assert_eq!(sort_column("file_type"), "d.file_type");
        // Never interpolated into SQL
        assert_eq!(sort_column("1; DROP TABLE documents"), "d.created_at");
        assert_eq!(sort_column(""), "d.created_at");
    }

    #[test]
    fn sort_direction_defaults_to_desc() {
        assert_eq!(sort_direction("asc"), "ASC");
        assert_eq!(sort_direction("ASC"), "ASC");
        assert_eq!(sort_direction("desc"), "DESC");
        assert_eq!(sort_direction("sideways"), "DESC");
    }

    #[test]
    fn folder_id_distinguishes_absent_from_null() {
        let absent: UpdateDocumentDto = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.folder_id, None);

        let null: UpdateDocumentDto = serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
        assert_eq!(null.folder_id, Some(None));

        let id = Uuid::new_v4();
        let body = format!(r#"{{"folder_id": "{}"}}"#, id);
        let set: UpdateDocumentDto = serde_json::from_str(&body).unwrap();
        assert_eq!(set.folder_id, Some(Some(id)));
    }

    #[test]
    fn bulk_delete_requires_at_least_one_id() {
        let empty = BulkDeleteDto { ids: vec![] };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("ids"));

        let one = BulkDeleteDto {
            ids: vec![Uuid::new_v4()],
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn search_defaults_apply() {
        let q: SearchQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(q.sort_by, "created_at");
        assert_eq!(q.sort_order, "desc");
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, DEFAULT_PAGE_SIZE);
    }
}
