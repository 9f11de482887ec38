//! Registration, login, and salted password hashing.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use db::models::user::{CreateUser, User, UserRole};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use utils::jwt::{self, TokenError};

const MIN_PASSWORD_LEN: usize = 8;
const SALT_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("username or email already taken")]
    Conflict,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

fn validate_registration(data: &RegisterRequest) -> Result<(), AuthError> {
    let username = data.username.trim();
    if username.len() < 3 || username.len() > 32 {
        return Err(AuthError::Validation(
            "username must be 3-32 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AuthError::Validation(
            "username may only contain letters, digits and underscores".to_string(),
        ));
    }
    if !data.email.contains('@') {
        return Err(AuthError::Validation("invalid email".to_string()));
    }
    if data.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// The duplicate pre-check races against concurrent registrations, so a
/// UNIQUE violation from the insert itself still reads as a conflict.
fn map_create_error(err: sqlx::Error) -> AuthError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::Conflict,
        other => AuthError::Database(other),
    }
}

pub struct AuthService;

impl AuthService {
    pub async fn register(pool: &SqlitePool, data: RegisterRequest) -> Result<User, AuthError> {
        validate_registration(&data)?;

        let username = data.username.trim().to_string();
        if User::find_by_username(pool, &username).await?.is_some()
            || User::find_by_email(pool, &data.email).await?.is_some()
        {
            return Err(AuthError::Conflict);
        }

        let salt = generate_salt();
        let user = User::create(
            pool,
            &CreateUser {
                username,
                email: data.email,
                password_hash: hash_password(&data.password, &salt),
                salt,
                role: data.role.unwrap_or_default(),
            },
        )
        .await
        .map_err(map_create_error)?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn login(
        pool: &SqlitePool,
        jwt_secret: &str,
        data: LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        let user = User::find_by_username(pool, data.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if hash_password(&data.password, &user.salt) != user.password_hash {
            return Err(AuthError::InvalidCredentials);
        }

        let token = jwt::mint(jwt_secret, user.id, &user.role.to_string())?;
        info!(user_id = %user.id, "login");
        Ok(LoginResponse { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic_per_salt() {
        let salt = generate_salt();
        assert_eq!(hash_password("hunter22", &salt), hash_password("hunter22", &salt));
        assert_ne!(
            hash_password("hunter22", &salt),
            hash_password("hunter22", &generate_salt())
        );
        assert_ne!(hash_password("a", &salt), hash_password("b", &salt));
    }

    #[test]
    fn registration_validation() {
        let base = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "longenough".to_string(),
            role: None,
        };
        assert!(validate_registration(&base).is_ok());

        let mut bad = base.clone();
        bad.username = "ab".to_string();
        assert!(validate_registration(&bad).is_err());

        let mut bad = base.clone();
        bad.username = "has space".to_string();
        assert!(validate_registration(&bad).is_err());

        let mut bad = base.clone();
        bad.email = "nope".to_string();
        assert!(validate_registration(&bad).is_err());

        let mut bad = base;
        bad.password = "short".to_string();
        assert!(validate_registration(&bad).is_err());
    }

    #[tokio::test]
    async fn concurrent_duplicate_insert_is_a_conflict() {
        let db = db::DBService::new_in_memory().await.unwrap();
        let make = |email: &str| CreateUser {
            username: "alice".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
            role: UserRole::Patient,
        };

        User::create(&db.pool, &make("alice@example.com")).await.unwrap();
        // Same username slipping past the pre-check.
        let err = User::create(&db.pool, &make("other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(map_create_error(err), AuthError::Conflict));
    }
}
