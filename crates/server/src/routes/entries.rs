//! CRUD for emotion entries.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::emotion_entry::EmotionEntry;
use serde::Deserialize;
use services::services::entries::{EntryPage, EntryPatch, EntryService, NewEntry};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

pub async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    axum::Json(payload): axum::Json<NewEntry>,
) -> Result<ResponseJson<ApiResponse<EmotionEntry>>, ApiError> {
    let entry = EntryService::create(&state.db.pool, user.user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<ResponseJson<ApiResponse<EntryPage>>, ApiError> {
    let page =
        EntryService::list(&state.db.pool, user.user_id, query.page, query.per_page).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<EmotionEntry>>, ApiError> {
    let entry = EntryService::get(&state.db.pool, user.user_id, id).await?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<EntryPatch>,
) -> Result<ResponseJson<ApiResponse<EmotionEntry>>, ApiError> {
    let entry = EntryService::update(&state.db.pool, user.user_id, id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    EntryService::delete(&state.db.pool, user.user_id, id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/entries",
        Router::new()
            .route("/", get(list_entries).post(create_entry))
            .route(
                "/{id}",
                get(get_entry).put(update_entry).delete(delete_entry),
            ),
    )
}
