use std::sync::Arc;

use db::DBService;
use services::services::{avatar::AvatarStore, llm::LlmClient};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: Arc<Config>,
    pub avatars: AvatarStore,
    pub llm: Option<LlmClient>,
}
