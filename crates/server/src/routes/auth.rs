//! Registration and login.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::user::User;
use services::services::auth::{AuthService, LoginRequest, LoginResponse, RegisterRequest};
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub async fn register(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<RegisterRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = AuthService::register(&state.db.pool, payload).await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn login(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let response = AuthService::login(&state.db.pool, &state.config.jwt_secret, payload).await?;
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login)),
    )
}
