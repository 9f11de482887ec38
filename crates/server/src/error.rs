//! Maps service errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    auth::AuthError, avatar::AvatarError, entries::EntryError, insights::InsightError,
    stats::StatsError, streak::StreakError,
};
use thiserror::Error;
use utils::{jwt::TokenError, response::ApiResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // A UNIQUE constraint hit means a concurrent writer won the race;
        // that is a conflict, not a server fault.
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Conflict("already exists".to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        // Never echo internals to the client on 5xx.
        let message = if status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::BadRequest(msg),
            AuthError::Conflict => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized,
            AuthError::Database(e) => e.into(),
            AuthError::Token(e) => Self::Internal(e.into()),
        }
    }
}

impl From<EntryError> for ApiError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Validation(msg) => Self::BadRequest(msg),
            EntryError::NotFound => Self::NotFound(err.to_string()),
            EntryError::Database(e) => Self::Database(e),
            EntryError::Streak(StreakError::Database(e)) => Self::Database(e),
        }
    }
}

impl From<StreakError> for ApiError {
    fn from(err: StreakError) -> Self {
        match err {
            StreakError::Database(e) => Self::Database(e),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Database(e) => Self::Database(e),
        }
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::Database(e) => Self::Database(e),
        }
    }
}

impl From<AvatarError> for ApiError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::Decode(_) | AvatarError::UnsupportedType(_) => {
                Self::BadRequest(err.to_string())
            }
            AvatarError::TooLarge => Self::BadRequest(err.to_string()),
            AvatarError::Io(e) => Self::Internal(e.into()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        Self::Unauthorized
    }
}
