use std::sync::Arc;

use axum::http::HeaderValue;
use sqlx::PgPool;

use crate::core::config::BootstrapConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::cookie;
use crate::features::auth::dtos::AuthUserDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::TokenService;
use crate::features::users::models::{Role, User};

/// Login, logout and session bootstrap.
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, secure_cookies: bool) -> Self {
        Self {
            pool,
            tokens,
            secure_cookies,
        }
    }

    /// Authenticate by email + password and mint a session token.
    ///
    /// Unknown email and wrong password are deliberately indistinguishable to
    /// the caller; an inactive account is a distinct outcome.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, AuthUserDto)> {
        let normalized = email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = $1")
            .bind(&normalized)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user for login: {:?}", e);
                AppError::Database(e)
            })?;

        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                return Err(AppError::Unauthorized(
                    "Invalid email or password".to_string(),
                ))
            }
        };

        if !user.is_active {
            return Err(AppError::Forbidden(
                "Your account is inactive. Please contact an administrator.".to_string(),
            ));
        }

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update last_login: {:?}", e);
                AppError::Database(e)
            })?;

        let identity = AuthenticatedUser {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
        };
        let token = self.tokens.issue(&identity)?;

        tracing::info!("User logged in: id={}, role={}", user.id, user.role.as_str());

        Ok((token, AuthUserDto::from(&user)))
    }

    /// Idempotently ensure the configured highest-privilege account exists.
    /// Runs once at startup; skipped (with a warning) when unconfigured.
    pub async fn ensure_bootstrap_super_admin(&self, config: &BootstrapConfig) -> Result<()> {
        let (email, password) = match (&config.admin_email, &config.admin_password) {
            (Some(email), Some(password)) => (email.trim().to_lowercase(), password),
            _ => {
                tracing::warn!(
                    "Bootstrap admin not configured (BOOTSTRAP_ADMIN_EMAIL/PASSWORD); skipping seed"
                );
                return Ok(());
            }
        };

        let password_hash = hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT ((LOWER(email)))
            DO UPDATE SET role = $4, is_active = TRUE, updated_at = NOW()
            "#,
        )
        .bind(&config.admin_name)
        .bind(&email)
        .bind(&password_hash)
        .bind(Role::SuperAdmin)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to seed bootstrap admin: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Ensured bootstrap SUPER_ADMIN account exists: {}", email);
        Ok(())
    }

    pub fn session_cookie(&self, token: &str) -> HeaderValue {
        cookie::session_cookie(token, self.tokens.ttl_secs(), self.secure_cookies)
    }

    pub fn clear_cookie(&self) -> HeaderValue {
        cookie::clear_session_cookie(self.secure_cookies)
    }
}
