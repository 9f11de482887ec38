//! Streak lookup.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::streak::Streak;
use services::services::streak::StreakService;
use utils::response::ApiResponse;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

pub async fn get_streak(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ResponseJson<ApiResponse<Streak>>, ApiError> {
    let streak = StreakService::get(&state.db.pool, user.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(streak)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/streak", get(get_streak))
}
