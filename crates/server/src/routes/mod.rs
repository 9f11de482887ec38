pub mod auth;
pub mod doctor;
pub mod entries;
pub mod insights;
pub mod stats;
pub mod streak;
pub mod users;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(entries::router())
        .merge(stats::router())
        .merge(streak::router())
        .merge(insights::router())
        .merge(doctor::router());

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}
