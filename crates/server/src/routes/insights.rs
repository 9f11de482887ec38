//! AI-assisted (or rule-based) emotional health recommendations.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::insights::{DEFAULT_WINDOW_DAYS, Insight, InsightService};
use utils::response::ApiResponse;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

pub async fn get_insights(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InsightQuery>,
) -> Result<ResponseJson<ApiResponse<Insight>>, ApiError> {
    let service = InsightService::new(state.llm.clone());
    let insight = service
        .generate(&state.db.pool, user.user_id, query.days)
        .await?;
    Ok(ResponseJson(ApiResponse::success(insight)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/insights", get(get_insights))
}
