//! Aggregated statistics over the caller's history.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::stats::{self, MoodSummary, MoodTrend, StatsService, WeekdayStat};
use utils::response::ApiResponse;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<ResponseJson<ApiResponse<MoodSummary>>, ApiError> {
    let (from, to) = stats::window(query.days);
    let summary = StatsService::summary(&state.db.pool, user.user_id, from, to).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub async fn weekdays(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<WeekdayStat>>>, ApiError> {
    let (from, to) = stats::window(query.days);
    let profile = StatsService::weekday_profile(&state.db.pool, user.user_id, from, to).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub async fn trend(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<ResponseJson<ApiResponse<MoodTrend>>, ApiError> {
    let (from, to) = stats::window(query.days);
    let trend = StatsService::trend(&state.db.pool, user.user_id, from, to).await?;
    Ok(ResponseJson(ApiResponse::success(trend)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/stats",
        Router::new()
            .route("/summary", get(summary))
            .route("/weekdays", get(weekdays))
            .route("/trend", get(trend)),
    )
}
