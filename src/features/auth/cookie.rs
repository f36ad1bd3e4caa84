//! Session cookie plumbing.
//!
//! The session token travels in an HTTP-only, SameSite=Strict cookie; a
//! Bearer Authorization header is accepted as an equivalent carrier for
//! non-browser clients.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::shared::constants::SESSION_COOKIE;

/// Extract the session token from a request: Bearer header first, then the
/// session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Build the Set-Cookie value for a freshly issued session token.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let mut value = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        value.push_str("; Secure");
    }
    HeaderValue::from_str(&value).expect("cookie value is always valid ASCII")
}

/// Build the Set-Cookie value that clears the session (empty value,
/// immediate expiry).
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    let mut value = format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        value.push_str("; Secure");
    }
    HeaderValue::from_str(&value).expect("cookie value is always valid ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=id"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("token=from-cookie"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn absent_or_empty_token_yields_none() {
        let headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert!(token_from_headers(&headers).is_none());
    }

    #[test]
    fn session_cookie_carries_the_required_attributes() {
        let value = session_cookie("tok", 604800, false);
        let s = value.to_str().unwrap();
        assert!(s.starts_with("token=tok;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("SameSite=Strict"));
        assert!(s.contains("Path=/"));
        assert!(s.contains("Max-Age=604800"));
        assert!(!s.contains("Secure"));

        let secure = session_cookie("tok", 60, true);
        assert!(secure.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn clearing_sets_an_empty_immediately_expired_cookie() {
        let value = clear_session_cookie(false);
        let s = value.to_str().unwrap();
        assert!(s.starts_with("token=;"));
        assert!(s.contains("Max-Age=0"));
    }
}
