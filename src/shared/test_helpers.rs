#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::features::users::models::Role;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};
#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
pub fn create_user_with_role(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        email: "test@example.com".to_string(),
        name: "Test User".to_string(),
        role,
        avatar_url: None,
    }
}

#[cfg(test)]
pub fn create_super_admin_user() -> AuthenticatedUser {
    create_user_with_role(Role::SuperAdmin)
}

#[cfg(test)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

#[cfg(test)]
pub fn with_super_admin_auth(router: Router) -> Router {
    with_auth(router, create_super_admin_user())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get};
    use axum_test::TestServer;

    use crate::features::auth::guards::RequireSuperAdmin;

    async fn admin_only(RequireSuperAdmin(_user): RequireSuperAdmin) -> StatusCode {
        StatusCode::OK
    }

    #[tokio::test]
    async fn super_admin_helper_satisfies_admin_guards() {
        let router = with_super_admin_auth(Router::new().route("/admin", get(admin_only)));
        let server = TestServer::new(router).unwrap();
        assert_eq!(server.get("/admin").await.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lower_tier_helper_fails_admin_guards() {
        let router = with_auth(
            Router::new().route("/admin", get(admin_only)),
            create_user_with_role(Role::Karyawan),
        );
        let server = TestServer::new(router).unwrap();
        assert_eq!(
            server.get("/admin").await.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
