use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::services::SessionClaims;
use crate::features::users::models::Role;

/// The caller's identity as established by the authorization gate, attached
/// to every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl AuthenticatedUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Central listing-scope rule: SUPER_ADMIN sees everything, everyone else
    /// sees their own records where an endpoint is owner-scoped. Single-sourced
    /// so scoping policy cannot drift between endpoints.
    pub fn sees_all(&self) -> bool {
        self.is_super_admin()
    }

    /// A caller may always delete their own uploaded document; deleting
    /// another user's document requires the highest tier.
    pub fn can_delete_document(&self, owner_id: Uuid) -> bool {
        self.is_super_admin() || self.id == owner_id
    }
}

impl From<SessionClaims> for AuthenticatedUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            avatar_url: claims.avatar_url,
        }
    }
}

// The session middleware stores the decoded identity in request extensions;
// handlers pull it back out through this extractor. A request that never
// passed the gate has no identity and is rejected with 401.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role,
            avatar_url: None,
        }
    }

    #[test]
    fn own_document_delete_is_allowed_at_any_tier() {
        let u = user(Role::Karyawan);
        assert!(u.can_delete_document(u.id));
        assert!(!u.can_delete_document(Uuid::new_v4()));
    }

    #[test]
    fn super_admin_deletes_anything() {
        let u = user(Role::SuperAdmin);
        assert!(u.can_delete_document(Uuid::new_v4()));
    }

    #[test]
    fn only_the_highest_tier_sees_all() {
        assert!(!user(Role::Karyawan).sees_all());
        assert!(!user(Role::Admin).sees_all());
        assert!(user(Role::SuperAdmin).sees_all());
    }
}
