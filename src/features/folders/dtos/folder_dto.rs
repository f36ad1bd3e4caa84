use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::folders::models::FolderWithMeta;
use crate::shared::validation::not_blank;

/// Request body for creating a folder.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderDto {
    #[validate(
        length(min = 1, max = 100, message = "must be between 1 and 100 characters"),
        custom(function = not_blank)
    )]
    pub name: String,
}

/// Request body for renaming a folder.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFolderDto {
    #[validate(
        length(min = 1, max = 100, message = "must be between 1 and 100 characters"),
        custom(function = not_blank)
    )]
    pub name: String,
}

/// Folder as served to listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FolderResponseDto {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub owner_name: String,
    pub owner_email: String,
    pub document_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FolderWithMeta> for FolderResponseDto {
    fn from(f: FolderWithMeta) -> Self {
        Self {
            id: f.id,
            name: f.name,
            user_id: f.user_id,
            owner_name: f.owner_name,
            owner_email: f.owner_email,
            document_count: f.document_count,
            created_at: f.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn folder_name_length_is_bounded() {
        assert!(CreateFolderDto { name: "".into() }.validate().is_err());
        assert!(CreateFolderDto {
            name: "a".repeat(101)
        }
        .validate()
        .is_err());
        assert!(CreateFolderDto {
            name: "Laporan 2026".into()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn whitespace_only_folder_names_are_rejected() {
        assert!(CreateFolderDto { name: "   ".into() }.validate().is_err());
        assert!(UpdateFolderDto { name: " \t".into() }.validate().is_err());
    }
}
