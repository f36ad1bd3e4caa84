use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{Role, UserWithMeta};
use crate::shared::validation::not_blank;

/// Request body for creating a user (SUPER_ADMIN only).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(custom(function = not_blank))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
}

/// Request body for updating a user. All fields optional; omitted fields are
/// left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(custom(function = not_blank))]
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// User row as served to the user management page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by_name: Option<String>,
    pub document_count: i64,
}

impl From<UserWithMeta> for UserResponseDto {
    fn from(u: UserWithMeta) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
            last_login: u.last_login,
            avatar_url: u.avatar_url,
            created_at: u.created_at,
            created_by_name: u.created_by_name,
            document_count: u.document_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_requires_a_six_character_password() {
        let dto = CreateUserDto {
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
            password: "short".to_string(),
            role: Role::Karyawan,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn update_with_no_fields_is_valid() {
        let dto = UpdateUserDto {
            name: None,
            role: None,
            is_active: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn update_rejects_an_empty_name() {
        let dto = UpdateUserDto {
            name: Some("".to_string()),
            role: None,
            is_active: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn whitespace_only_names_are_rejected() {
        let dto = CreateUserDto {
            name: "  ".to_string(),
            email: "budi@example.com".to_string(),
            password: "secret123".to_string(),
            role: Role::Karyawan,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let dto = UpdateUserDto {
            name: Some(" \t\n".to_string()),
            role: None,
            is_active: None,
        };
        assert!(dto.validate().is_err());
    }
}
