use crate::core::error::AppError;
use crate::features::auth::cookie::token_from_headers;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::TokenService;
use crate::features::users::models::Role;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(auth_header) = auth_header {
                if let Some(encoded) = auth_header.strip_prefix("Basic ") {
                    if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                        if let Ok(creds) = String::from_utf8(decoded) {
                            if creds == *credentials {
                                return Ok(next.run(req).await);
                            }
                        }
                    }
                }
            }

            let response = Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")
                .body(Body::from("Unauthorized"))
                .unwrap();

            Err(response)
        })
    }
}

/// Action-level session check for API routes. Decodes the session token from
/// the cookie (or a Bearer header) and attaches the caller's identity to the
/// request. An absent token and an invalid or expired one are rejected the
/// same way: full re-authentication is required either way.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let claims = tokens
        .decode(&token)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))?;

    req.extensions_mut()
        .insert(AuthenticatedUser::from(claims));
    Ok(next.run(req).await)
}

// =============================================================================
// ROUTE-LEVEL GATE (page navigation)
// =============================================================================

/// Authorization state of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    AuthenticatedInsufficient,
    AuthenticatedOk,
}

/// Pages reachable only by the highest role tier. Explicit allow-list.
const ADMIN_PAGES: &[&str] = &["/users", "/monitoring"];

pub fn is_admin_page(path: &str) -> bool {
    ADMIN_PAGES.iter().any(|page| path.starts_with(page))
}

pub fn is_login_page(path: &str) -> bool {
    path.starts_with("/login")
}

/// Classify a page request given the decoded session (if any).
pub fn gate_state(role: Option<Role>, path: &str) -> GateState {
    match role {
        None => GateState::Unauthenticated,
        Some(role) if is_admin_page(path) && role != Role::SuperAdmin => {
            GateState::AuthenticatedInsufficient
        }
        Some(_) => GateState::AuthenticatedOk,
    }
}

/// Build the login redirect target, preserving the originally requested path
/// so the user lands back where they intended after authenticating.
pub fn login_redirect_target(path: &str) -> String {
    if path == "/" {
        "/login".to_string()
    } else {
        format!("/login?next={}", urlencoding::encode(path))
    }
}

/// Route-level gate over the page router. Redirects rather than erroring:
/// unauthenticated requests go to the login page, authenticated-but-
/// insufficient ones are soft-denied to the dashboard, and a valid session
/// visiting the login page is sent away from it.
pub async fn page_gate(
    State(tokens): State<Arc<TokenService>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let role = token_from_headers(req.headers())
        .and_then(|token| tokens.decode(&token))
        .map(|claims| claims.role);

    let state = gate_state(role, &path);

    if is_login_page(&path) {
        return match state {
            // An authenticated user cannot see the login form
            GateState::AuthenticatedOk | GateState::AuthenticatedInsufficient => {
                Redirect::temporary("/dashboard").into_response()
            }
            GateState::Unauthenticated => next.run(req).await,
        };
    }

    match state {
        GateState::Unauthenticated => {
            Redirect::temporary(&login_redirect_target(&path)).into_response()
        }
        GateState::AuthenticatedInsufficient => Redirect::temporary("/dashboard").into_response(),
        GateState::AuthenticatedOk => next.run(req).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_pages_are_an_explicit_allow_list() {
        assert!(is_admin_page("/users"));
        assert!(is_admin_page("/users/123"));
        assert!(is_admin_page("/monitoring"));
        assert!(!is_admin_page("/dashboard"));
        assert!(!is_admin_page("/folders"));
    }

    #[test]
    fn gate_state_transitions() {
        assert_eq!(gate_state(None, "/dashboard"), GateState::Unauthenticated);
        assert_eq!(
            gate_state(Some(Role::Karyawan), "/users"),
            GateState::AuthenticatedInsufficient
        );
        assert_eq!(
            gate_state(Some(Role::Admin), "/monitoring"),
            GateState::AuthenticatedInsufficient
        );
        assert_eq!(
            gate_state(Some(Role::SuperAdmin), "/users"),
            GateState::AuthenticatedOk
        );
        assert_eq!(
            gate_state(Some(Role::Karyawan), "/dashboard"),
            GateState::AuthenticatedOk
        );
    }

    #[test]
    fn login_redirect_preserves_return_target() {
        assert_eq!(login_redirect_target("/"), "/login");
        assert_eq!(
            login_redirect_target("/folders/abc"),
            "/login?next=%2Ffolders%2Fabc"
        );
    }
}
