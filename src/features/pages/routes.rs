//! Page routes behind the route-level gate.
//!
//! The pages themselves are thin shells; the browser client drives the API.
//! What matters here is the gate: unauthenticated visitors are redirected to
//! the login page with a return target, non-admins are soft-denied away from
//! admin pages, and authenticated users never see the login form.

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, response::Html, routing::get, Router};

use crate::core::middleware::page_gate;
use crate::features::auth::services::TokenService;

async fn index() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

async fn login() -> Html<&'static str> {
    Html(include_str!("templates/login.html"))
}

async fn app_shell() -> Html<&'static str> {
    Html(include_str!("templates/app.html"))
}

/// Create the page router, gated by the route-level session check.
pub fn routes(tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/dashboard", get(app_shell))
        .route("/documents", get(app_shell))
        .route("/upload", get(app_shell))
        .route("/folders", get(app_shell))
        .route("/profile", get(app_shell))
        .route("/users", get(app_shell))
        .route("/monitoring", get(app_shell))
        .route("/help", get(app_shell))
        .layer(from_fn_with_state(tokens, page_gate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use uuid::Uuid;

    use crate::core::config::AuthConfig;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::models::Role;
    use crate::shared::constants::SESSION_COOKIE;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(&AuthConfig {
            jwt_secret: "page-gate-test-secret".to_string(),
            token_ttl_secs: 3600,
        }))
    }

    fn cookie_for(tokens: &TokenService, role: Role) -> String {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            role,
            avatar_url: None,
        };
        format!("{}={}", SESSION_COOKIE, tokens.issue(&user).unwrap())
    }

    fn server(tokens: Arc<TokenService>) -> TestServer {
        TestServer::new(routes(tokens)).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_visitor_is_sent_to_login_with_return_target() {
        let server = server(tokens());
        let response = server.get("/dashboard").await;

        assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.header("location").to_str().unwrap(),
            "/login?next=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn root_redirects_to_plain_login() {
        let server = server(tokens());
        let response = server.get("/").await;

        assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location").to_str().unwrap(), "/login");
    }

    #[tokio::test]
    async fn authenticated_visitor_is_bounced_off_the_login_page() {
        let svc = tokens();
        let cookie = cookie_for(&svc, Role::Karyawan);
        let server = server(svc);

        let response = server.get("/login").add_header("cookie", cookie).await;

        assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn non_admin_is_soft_denied_from_admin_pages() {
        let svc = tokens();
        let server_handle = server(svc.clone());

        for role in [Role::Karyawan, Role::Admin] {
            let cookie = cookie_for(&svc, role);
            for page in ["/users", "/monitoring"] {
                let response = server_handle
                    .get(page)
                    .add_header("cookie", cookie.clone())
                    .await;
                assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
                assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");
            }
        }
    }

    #[tokio::test]
    async fn super_admin_reaches_admin_pages() {
        let svc = tokens();
        let cookie = cookie_for(&svc, Role::SuperAdmin);
        let server = server(svc);

        let response = server.get("/users").add_header("cookie", cookie).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tampered_cookie_counts_as_unauthenticated() {
        let svc = tokens();
        let server = server(svc);

        let response = server
            .get("/dashboard")
            .add_header("cookie", format!("{}=not-a-real-token", SESSION_COOKIE))
            .await;

        assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.header("location").to_str().unwrap(),
            "/login?next=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn regular_pages_are_reachable_once_authenticated() {
        let svc = tokens();
        let cookie = cookie_for(&svc, Role::Karyawan);
        let server = server(svc);

        for page in ["/dashboard", "/documents", "/folders", "/help"] {
            let response = server.get(page).add_header("cookie", cookie.clone()).await;
            assert_eq!(response.status_code(), StatusCode::OK, "page {}", page);
        }
    }
}
