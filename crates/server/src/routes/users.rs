//! Current-user profile and avatar upload.

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::user::User;
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

/// Body limit for the avatar route. Base64 inflates the decoded cap by 4/3,
/// and the JSON framing adds a little more, so axum's 2 MB default would cut
/// off uploads well under the documented size.
const AVATAR_BODY_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Debug, Deserialize, TS)]
pub struct UpdateProfileRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct AvatarUploadRequest {
    /// Base64-encoded image bytes.
    pub data: String,
    pub content_type: String,
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(&state.db.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    axum::Json(payload): axum::Json<UpdateProfileRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("invalid email".to_string()));
    }
    if let Some(other) = User::find_by_email(&state.db.pool, &payload.email).await? {
        if other.id != user.user_id {
            return Err(ApiError::Conflict("email already taken".to_string()));
        }
    }
    let updated = User::update_email(&state.db.pool, user.user_id, &payload.email).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    axum::Json(payload): axum::Json<AvatarUploadRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let file_name = state
        .avatars
        .save(user.user_id, &payload.data, &payload.content_type)
        .await?;
    User::set_avatar_path(&state.db.pool, user.user_id, &file_name).await?;

    let updated = User::find_by_id(&state.db.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users",
        Router::new()
            .route("/me", get(me).put(update_me))
            .route(
                "/me/avatar",
                put(upload_avatar).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
            ),
    )
}
