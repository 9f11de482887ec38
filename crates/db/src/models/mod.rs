pub mod emotion_entry;
pub mod streak;
pub mod user;
