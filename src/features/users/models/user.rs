use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role tiers, strictly ordered by capability.
///
/// Each higher tier is a strict superset of the lower:
/// - KARYAWAN: upload/download/list documents, create folders, delete own uploads
/// - ADMIN: same surface as KARYAWAN with broader folder visibility
/// - SUPER_ADMIN: full CRUD on documents, folders and users; activity log access
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Karyawan,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Karyawan => "KARYAWAN",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

/// Identity record. Deliberately not Serialize: the password hash must never
/// reach a response body, so handlers go through response DTOs instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub avatar_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_strictly_ordered() {
        assert!(Role::Karyawan < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn roles_serialize_to_product_names() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"SUPER_ADMIN\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"KARYAWAN\"").unwrap(),
            Role::Karyawan
        );
        assert!(serde_json::from_str::<Role>("\"ROOT\"").is_err());
    }
}
