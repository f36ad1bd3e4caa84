use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::Role;

/// Claims carried by the stateless session token. Minted at login, re-minted
/// on avatar change, never persisted server-side. There is no revocation
/// list: a token stays valid until its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens with a server-held HMAC-SHA256 secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl_secs: config.token_ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a signed session token for the given identity.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign session token: {}", e)))
    }

    /// Verify and decode a session token.
    ///
    /// Returns None on any failure: bad signature, expiry, malformed shape,
    /// missing mandatory claims. Callers must treat "invalid" and "expired"
    /// identically (full re-authentication), so no distinction is surfaced.
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).ok()?;
        let claims = data.claims;

        // Shape validation beyond signature/expiry: the embedded identity
        // must itself be well-formed before any handler trusts it.
        if claims.id.is_nil() {
            return None;
        }
        if !claims.email.validate_email() {
            return None;
        }
        if claims.name.trim().is_empty() {
            return None;
        }

        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret-key".to_string(),
            token_ttl_secs: 3600,
        })
    }

    fn identity() -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "budi@example.com".to_string(),
            name: "Budi".to_string(),
            role: Role::Admin,
            avatar_url: Some("/uploads/avatars/x.png".to_string()),
        }
    }

    #[test]
    fn round_trip_preserves_identity_claims() {
        let svc = service();
        let user = identity();
        let token = svc.issue(&user).unwrap();
        let claims = svc.decode(&token).expect("freshly issued token decodes");

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.role, user.role);
        assert_eq!(claims.avatar_url, user.avatar_url);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_tokens_decode_to_none() {
        let svc = service();
        let token = svc.issue(&identity()).unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload: Vec<char> = parts[1].chars().collect();
        payload[0] = if payload[0] == 'A' { 'B' } else { 'A' };
        parts[1] = payload.into_iter().collect();
        let tampered = parts.join(".");

        assert!(svc.decode(&tampered).is_none());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "a-different-secret".to_string(),
            token_ttl_secs: 3600,
        });
        let token = other.issue(&identity()).unwrap();
        assert!(service().decode(&token).is_none());
    }

    #[test]
    fn expired_tokens_decode_to_none() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role: Role::Karyawan,
            avatar_url: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(svc.decode(&token).is_none());
    }

    #[test]
    fn mis_shaped_claims_decode_to_none() {
        let svc = service();
        let now = Utc::now().timestamp();

        // Well-signed but with an unknown role value
        #[derive(Serialize)]
        struct RawClaims<'a> {
            id: Uuid,
            email: &'a str,
            name: &'a str,
            role: &'a str,
            iat: i64,
            exp: i64,
        }
        let key = EncodingKey::from_secret(b"test-secret-key");

        let bad_role = RawClaims {
            id: Uuid::new_v4(),
            email: "a@b.com",
            name: "A",
            role: "ROOT",
            iat: now,
            exp: now + 3600,
        };
        let token = encode(&Header::default(), &bad_role, &key).unwrap();
        assert!(svc.decode(&token).is_none());

        let bad_email = RawClaims {
            id: Uuid::new_v4(),
            email: "not-an-email",
            name: "A",
            role: "ADMIN",
            iat: now,
            exp: now + 3600,
        };
        let token = encode(&Header::default(), &bad_email, &key).unwrap();
        assert!(svc.decode(&token).is_none());

        let empty_name = RawClaims {
            id: Uuid::new_v4(),
            email: "a@b.com",
            name: "  ",
            role: "ADMIN",
            iat: now,
            exp: now + 3600,
        };
        let token = encode(&Header::default(), &empty_name, &key).unwrap();
        assert!(svc.decode(&token).is_none());
    }

    #[test]
    fn garbage_input_never_panics() {
        let svc = service();
        assert!(svc.decode("").is_none());
        assert!(svc.decode("not.a.jwt").is_none());
        assert!(svc.decode("a.b").is_none());
    }
}
