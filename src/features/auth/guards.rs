//! Role-based authorization guards.
//!
//! Role hierarchy (highest to lowest):
//! - SUPER_ADMIN: full access, including user management and monitoring
//! - ADMIN: elevated document access
//! - KARYAWAN: regular staff, owner-scoped access
//!
//! Guards extract the authenticated user from request extensions and reject
//! with 401 (no identity) or 403 (insufficient role).

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// Guard for endpoints restricted to SUPER_ADMIN.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireSuperAdmin(user): RequireSuperAdmin) { ... }
/// ```
pub struct RequireSuperAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_super_admin() {
            return Err(AppError::Forbidden(
                "Super admin access required".to_string(),
            ));
        }

        Ok(RequireSuperAdmin(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    use crate::features::users::models::Role;

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let mut request = Request::builder().body(()).unwrap();
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        request.into_parts().0
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let mut parts = parts_with(None);
        let result = RequireSuperAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn lower_tiers_are_forbidden() {
        for role in [Role::Karyawan, Role::Admin] {
            let mut parts = parts_with(Some(user(role)));
            let result = RequireSuperAdmin::from_request_parts(&mut parts, &()).await;
            assert!(matches!(result, Err(AppError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn super_admin_passes() {
        let mut parts = parts_with(Some(user(Role::SuperAdmin)));
        let result = RequireSuperAdmin::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }
}
