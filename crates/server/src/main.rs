//! Mood tracking backend.
//!
//! Boots the Axum server: loads configuration from the environment, opens
//! the database, and wires up all API routes.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use db::DBService;
use services::services::{avatar::AvatarStore, llm::LlmClient};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = DBService::new(&config.database_url).await?;
    let avatars = AvatarStore::new(&config.avatar_dir);

    let llm = match &config.anthropic_api_key {
        Some(key) => Some(LlmClient::new(key.clone(), None)?),
        None => {
            warn!("ANTHROPIC_API_KEY not set; insights will be rule-based only");
            None
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        db,
        config: Arc::new(config),
        avatars,
        llm,
    };

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
