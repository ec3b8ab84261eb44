use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthUserDto, LoginRequestDto, LoginResponseDto, RegisterRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::models::{CreateUser, Session, User, UserStatus};
use crate::features::auth::services::password::{
    generate_session_token, hash_password, hash_session_token, verify_password,
};

const USER_COLUMNS: &str = r#"
    id, user_code, full_name, email, phone, password_hash,
    role, status, last_login_at, created_at, updated_at
"#;

/// Expired sessions of one user; run on each sign-in so the table stays bounded
const PURGE_EXPIRED_SESSIONS: &str =
    "DELETE FROM sessions WHERE user_id = $1 AND expires_at <= NOW()";

/// Service for account registration, login and session resolution
pub struct AuthService {
    pool: PgPool,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(pool: PgPool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    /// Generate a shareable user code in format: USR-XXXXXXXX
    fn generate_user_code() -> String {
        let token = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("USR-{}", &token[..8])
    }

    /// Register a new account
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthUserDto> {
        let email = dto.email.trim().to_lowercase();

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = $1)")
                .bind(&email)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        // CPU-bound; runs on the blocking pool
        let password = dto.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let data = CreateUser {
            user_code: Self::generate_user_code(),
            full_name: dto.full_name.trim().to_string(),
            email,
            phone: dto.phone.trim().to_string(),
            password_hash,
            role: dto.role,
        };

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (user_code, full_name, email, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&data.user_code)
        .bind(&data.full_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Unique index on lower(email) lost a race with a concurrent registration
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            other => AppError::Database(other),
        })?;

        tracing::info!("Registered user {} with role {}", user.user_code, user.role);
        Ok(user.into())
    }

    /// Verify credentials and open a new session
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let email = dto.email.trim().to_lowercase();
        let invalid = || AppError::Unauthorized("Invalid email, password or role".to_string());

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = $1 AND role = $2"
        ))
        .bind(&email)
        .bind(dto.role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(invalid)?;

        let password = dto.password;
        let stored_hash = user.password_hash.clone();
        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?;
        if !password_valid {
            tracing::debug!("Password mismatch for {}", user.user_code);
            return Err(invalid());
        }

        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        let purged = sqlx::query(PURGE_EXPIRED_SESSIONS)
            .bind(user.id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!("Purged {} expired session(s) for {}", purged, user.user_code);
        }

        let token = generate_session_token();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.session_ttl)
                .map_err(|e| AppError::Internal(format!("Invalid session TTL: {}", e)))?;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token_hash, user_id, created_at, expires_at
            "#,
        )
        .bind(hash_session_token(&token))
        .bind(user.id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("User {} signed in", user.user_code);

        Ok(LoginResponseDto {
            username: user.full_name.clone(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: (session.expires_at - session.created_at).num_seconds(),
            user: user.into(),
        })
    }

    /// Close the session addressed by `token`. Unknown tokens are not an error.
    pub async fn logout(&self, token: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(hash_session_token(token))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Logout removed {} session(s)", result.rows_affected());
        Ok(())
    }

    /// Look up the active, non-suspended user behind a bearer token
    pub async fn resolve_session(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.user_code, u.full_name, u.email, u.phone, u.password_hash,
                   u.role, u.status, u.last_login_at, u.created_at, u.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW() AND u.status = 'active'
            "#,
        )
        .bind(hash_session_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(|u| AuthenticatedUser {
            user_id: u.id,
            user_code: u.user_code,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
        }))
    }

    /// Fetch the full profile of the signed-in user
    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<AuthUserDto> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user.user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_user_code_format() {
        let code = AuthService::generate_user_code();
        assert!(code.starts_with("USR-"));
        assert_eq!(code.len(), 12);
        assert!(code[4..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_session_purge_only_touches_expired_rows_of_one_user() {
        assert!(PURGE_EXPIRED_SESSIONS.starts_with("DELETE FROM sessions"));
        assert!(PURGE_EXPIRED_SESSIONS.contains("user_id = $1"));
        assert!(PURGE_EXPIRED_SESSIONS.contains("expires_at <= NOW()"));
    }
}
