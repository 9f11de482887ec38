pub mod auth;
pub mod avatar;
pub mod entries;
pub mod insights;
pub mod llm;
pub mod stats;
pub mod streak;
pub mod vocabulary;
