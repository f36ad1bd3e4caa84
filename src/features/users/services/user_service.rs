use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::ActivityAction;
use crate::features::activity::services::ActivityService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::hash_password;
use crate::features::auth::services::TokenService;
use crate::features::users::dtos::{CreateUserDto, UpdateUserDto, UserResponseDto};
use crate::features::users::models::{User, UserWithMeta};
use crate::modules::storage::DiskStorage;
use crate::shared::types::PaginationQuery;

const LIST_QUERY: &str = r#"
    SELECT u.id, u.name, u.email, u.role, u.is_active, u.last_login,
           u.avatar_url, u.created_at,
           c.name AS created_by_name,
           COALESCE(d.cnt, 0) AS document_count
    FROM users u
    LEFT JOIN users c ON c.id = u.created_by
    LEFT JOIN (
        SELECT uploaded_by, COUNT(*) AS cnt
        FROM documents
        GROUP BY uploaded_by
    ) d ON d.uploaded_by = u.id
"#;

/// User management and profile operations.
pub struct UserService {
    pool: PgPool,
    activity: Arc<ActivityService>,
    tokens: Arc<TokenService>,
    storage: Arc<DiskStorage>,
}

impl UserService {
    pub fn new(
        pool: PgPool,
        activity: Arc<ActivityService>,
        tokens: Arc<TokenService>,
        storage: Arc<DiskStorage>,
    ) -> Self {
        Self {
            pool,
            activity,
            tokens,
            storage,
        }
    }

    /// List users, newest first, with creator name and upload counts.
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let query = format!("{} ORDER BY u.created_at DESC OFFSET $1 LIMIT $2", LIST_QUERY);
        let rows = sqlx::query_as::<_, UserWithMeta>(&query)
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(UserResponseDto::from).collect(), total))
    }

    /// Create a user. Email uniqueness is case-insensitive; the unique index
    /// is the authoritative check, the SELECT is only a friendlier fast path.
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateUserDto,
        ip_address: Option<String>,
    ) -> Result<UserResponseDto> {
        let email = dto.email.trim().to_lowercase();

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE LOWER(email) = $1")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;
        if exists.is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active, created_by)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING *
            "#,
        )
        .bind(dto.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(dto.role)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::Database(e);
            if err.is_unique_violation() {
                AppError::Conflict("User with this email already exists".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", err);
                err
            }
        })?;

        self.activity
            .record(
                actor.id,
                ActivityAction::CreateUser,
                None,
                Some(format!(
                    "Created user {} with role {}",
                    user.email,
                    user.role.as_str()
                )),
                ip_address,
            )
            .await;

        Ok(UserResponseDto {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            last_login: user.last_login,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            created_by_name: Some(actor.name.clone()),
            document_count: 0,
        })
    }

    /// Update a user's name, role or active flag.
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        target_id: Uuid,
        dto: UpdateUserDto,
        ip_address: Option<String>,
    ) -> Result<UserResponseDto> {
        validate_self_update(actor.id, target_id, &dto)?;

        let before = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let after = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(target_id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.role)
        .bind(dto.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user {}: {:?}", target_id, e);
            AppError::Database(e)
        })?;

        if before.role != after.role {
            self.activity
                .record(
                    actor.id,
                    ActivityAction::UpdateUserRole,
                    None,
                    Some(format!(
                        "Changed role of {} from {} to {}",
                        after.email,
                        before.role.as_str(),
                        after.role.as_str()
                    )),
                    ip_address.clone(),
                )
                .await;
        }
        if before.is_active != after.is_active {
            let verb = if after.is_active {
                "Activated"
            } else {
                "Deactivated"
            };
            self.activity
                .record(
                    actor.id,
                    ActivityAction::ToggleUserStatus,
                    None,
                    Some(format!("{} account {}", verb, after.email)),
                    ip_address,
                )
                .await;
        }

        self.fetch_with_meta(after.id).await
    }

    /// Replace the caller's avatar and mint a fresh session token carrying
    /// the new avatar URL. The caller must have already validated size and
    /// content type.
    pub async fn update_avatar(
        &self,
        user: &AuthenticatedUser,
        original_name: &str,
        data: &[u8],
    ) -> Result<(String, AuthenticatedUser)> {
        let old = sqlx::query_scalar::<_, Option<String>>(
            "SELECT avatar_url FROM users WHERE id = $1",
        )
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let filename = DiskStorage::generate_filename(original_name);
        let key = format!("avatars/{}", filename);
        self.storage.write(&key, data).await?;

        let avatar_url = format!("/uploads/{}", key);
        sqlx::query("UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(&avatar_url)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update avatar for {}: {:?}", user.id, e);
                AppError::Database(e)
            })?;

        if let Some(old_url) = old {
            if let Some(old_key) = old_url.strip_prefix("/uploads/") {
                self.storage.delete_best_effort(old_key).await;
            }
        }

        let refreshed = AuthenticatedUser {
            avatar_url: Some(avatar_url),
            ..user.clone()
        };
        let token = self.tokens.issue(&refreshed)?;

        Ok((token, refreshed))
    }

    async fn fetch_with_meta(&self, id: Uuid) -> Result<UserResponseDto> {
        let query = format!("{} WHERE u.id = $1", LIST_QUERY);
        let row = sqlx::query_as::<_, UserWithMeta>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(UserResponseDto::from(row))
    }
}

/// Self-protection: an admin cannot demote or deactivate their own account,
/// which would otherwise make a sole SUPER_ADMIN lock everyone out.
fn validate_self_update(actor_id: Uuid, target_id: Uuid, dto: &UpdateUserDto) -> Result<()> {
    if actor_id != target_id {
        return Ok(());
    }
    if dto.role.is_some() {
        return Err(AppError::BadRequest(
            "Cannot change your own admin privileges".to_string(),
        ));
    }
    if dto.is_active == Some(false) {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;

    fn dto(role: Option<Role>, is_active: Option<bool>) -> UpdateUserDto {
        UpdateUserDto {
            name: None,
            role,
            is_active,
        }
    }

    #[test]
    fn cannot_change_own_role() {
        let id = Uuid::new_v4();
        let result = validate_self_update(id, id, &dto(Some(Role::Karyawan), None));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn cannot_deactivate_own_account() {
        let id = Uuid::new_v4();
        let result = validate_self_update(id, id, &dto(None, Some(false)));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn renaming_and_reactivating_yourself_is_fine() {
        let id = Uuid::new_v4();
        assert!(validate_self_update(id, id, &dto(None, Some(true))).is_ok());
        assert!(validate_self_update(
            id,
            id,
            &UpdateUserDto {
                name: Some("New Name".to_string()),
                role: None,
                is_active: None
            }
        )
        .is_ok());
    }

    #[test]
    fn other_accounts_are_unrestricted() {
        let result = validate_self_update(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &dto(Some(Role::Karyawan), Some(false)),
        );
        assert!(result.is_ok());
    }
}
