//! Bearer-token extractor for authenticated routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use db::models::user::UserRole;
use utils::jwt;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Identity decoded from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn require_doctor(&self) -> Result<(), ApiError> {
        if self.role == UserRole::Doctor {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = jwt::verify(&state.config.jwt_secret, token)?;
        let user_id = claims.user_id()?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser { user_id, role })
    }
}
