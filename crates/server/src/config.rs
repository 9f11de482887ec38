//! Process configuration from the environment.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub avatar_dir: String,
    /// Absent means insights fall back to the rule engine only.
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => 3000,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:moodlog.db".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            avatar_dir: std::env::var("AVATAR_DIR").unwrap_or_else(|_| "./avatars".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
        })
    }
}
