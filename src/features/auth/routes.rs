use std::sync::Arc;

use axum::{routing::get, routing::post, Router};

use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;

/// Public auth routes: login and logout need no prior session.
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(service)
}

/// Routes that require an authenticated session.
pub fn protected_routes() -> Router {
    Router::new().route("/api/auth/me", get(handlers::get_me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{create_user_with_role, with_auth};

    #[tokio::test]
    async fn me_returns_the_attached_identity() {
        let user = create_user_with_role(Role::Karyawan);
        let router = with_auth(protected_routes(), user.clone());
        let server = TestServer::new(router).unwrap();

        let response = server.get("/api/auth/me").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], user.email.as_str());
        assert_eq!(body["data"]["role"], "KARYAWAN");
    }

    #[tokio::test]
    async fn me_without_identity_is_unauthorized() {
        let server = TestServer::new(protected_routes()).unwrap();
        let response = server.get("/api/auth/me").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
