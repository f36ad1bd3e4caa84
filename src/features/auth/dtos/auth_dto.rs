use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{Role, User};

/// Request body for login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// The authenticated user as returned by login and /api/auth/me.
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for AuthUserDto {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            avatar_url: u.avatar_url.clone(),
            last_login: u.last_login,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn rejects_malformed_email_and_empty_password() {
        let dto = LoginRequestDto {
            email: "not-an-email".to_string(),
            password: "".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let dto = LoginRequestDto {
            email: "budi@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(dto.validate().is_ok());
    }
}
