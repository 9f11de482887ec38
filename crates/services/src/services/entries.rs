//! Entry lifecycle: validation, vocabulary normalization, streak upkeep.

use chrono::{DateTime, Utc};
use db::models::emotion_entry::{CreateEmotionEntry, EmotionEntry, UpdateEmotionEntry};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    streak::{StreakError, StreakService},
    vocabulary::{self, IntensityLevel},
};

pub const MAX_NOTE_LEN: usize = 2000;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("{0}")]
    Validation(String),
    #[error("entry not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Streak(#[from] StreakError),
}

/// Create payload as the client sends it: emotion in either vocabulary,
/// intensity as a number or a level.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct NewEntry {
    pub emotion: String,
    pub intensity: Option<i32>,
    pub intensity_level: Option<IntensityLevel>,
    pub note: Option<String>,
    /// Defaults to now.
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct EntryPatch {
    pub emotion: Option<String>,
    pub intensity: Option<i32>,
    pub intensity_level: Option<IntensityLevel>,
    /// Absent leaves the note alone; an explicit `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// One page of entries plus the total so clients can drive pagination.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct EntryPage {
    pub entries: Vec<EmotionEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

fn resolve_intensity(
    intensity: Option<i32>,
    level: Option<IntensityLevel>,
) -> Result<Option<i32>, EntryError> {
    match (intensity, level) {
        (Some(n), _) => {
            if !(1..=10).contains(&n) {
                return Err(EntryError::Validation(
                    "intensity must be between 1 and 10".to_string(),
                ));
            }
            Ok(Some(n))
        }
        (None, Some(level)) => Ok(Some(vocabulary::midpoint(level))),
        (None, None) => Ok(None),
    }
}

fn validate_note(note: Option<&str>) -> Result<(), EntryError> {
    if note.is_some_and(|n| n.len() > MAX_NOTE_LEN) {
        return Err(EntryError::Validation(format!(
            "note must be at most {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(())
}

pub struct EntryService;

impl EntryService {
    /// Normalize, persist, and advance the owner's streak.
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: NewEntry,
    ) -> Result<EmotionEntry, EntryError> {
        let emotion = vocabulary::parse_emotion(&data.emotion).ok_or_else(|| {
            EntryError::Validation(format!("unknown emotion: {}", data.emotion))
        })?;
        let intensity = resolve_intensity(data.intensity, data.intensity_level)?
            .ok_or_else(|| {
                EntryError::Validation("intensity or intensity_level is required".to_string())
            })?;
        validate_note(data.note.as_deref())?;

        let recorded_at = data.recorded_at.unwrap_or_else(Utc::now);

        let entry = EmotionEntry::create(
            pool,
            &CreateEmotionEntry {
                user_id,
                emotion,
                intensity,
                note: data.note,
                recorded_at,
            },
        )
        .await?;

        StreakService::record_entry_day(pool, user_id, recorded_at.date_naive()).await?;

        info!(%user_id, entry_id = %entry.id, %emotion, intensity, "entry created");
        Ok(entry)
    }

    pub async fn get(
        pool: &SqlitePool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<EmotionEntry, EntryError> {
        EmotionEntry::find_for_user(pool, id, user_id)
            .await?
            .ok_or(EntryError::NotFound)
    }

    pub async fn list(
        pool: &SqlitePool,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> Result<EntryPage, EntryError> {
        let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
        let page = page.max(1);
        let total = EmotionEntry::count_by_user(pool, user_id).await?;
        let entries =
            EmotionEntry::find_by_user(pool, user_id, per_page, (page - 1) * per_page).await?;
        Ok(EntryPage {
            entries,
            total,
            page,
            per_page,
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
    ) -> Result<EmotionEntry, EntryError> {
        let emotion = match &patch.emotion {
            Some(raw) => Some(vocabulary::parse_emotion(raw).ok_or_else(|| {
                EntryError::Validation(format!("unknown emotion: {raw}"))
            })?),
            None => None,
        };
        let intensity = resolve_intensity(patch.intensity, patch.intensity_level)?;
        validate_note(patch.note.as_ref().and_then(|n| n.as_deref()))?;

        EmotionEntry::update(
            pool,
            id,
            user_id,
            &UpdateEmotionEntry {
                emotion,
                intensity,
                note: patch.note,
            },
        )
        .await?
        .ok_or(EntryError::NotFound)
    }

    /// Delete and rebuild the streak, since the removed entry may have been
    /// the only one on its day.
    pub async fn delete(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<(), EntryError> {
        let deleted = EmotionEntry::delete(pool, id, user_id).await?;
        if deleted == 0 {
            return Err(EntryError::NotFound);
        }
        StreakService::rebuild(pool, user_id).await?;
        info!(%user_id, entry_id = %id, "entry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_intensity_must_be_in_range() {
        assert!(resolve_intensity(Some(0), None).is_err());
        assert!(resolve_intensity(Some(11), None).is_err());
        assert_eq!(resolve_intensity(Some(10), None).unwrap(), Some(10));
    }

    #[test]
    fn level_converts_when_number_absent() {
        assert_eq!(
            resolve_intensity(None, Some(IntensityLevel::High)).unwrap(),
            Some(8)
        );
    }

    #[test]
    fn number_wins_over_level() {
        assert_eq!(
            resolve_intensity(Some(3), Some(IntensityLevel::VeryHigh)).unwrap(),
            Some(3)
        );
    }

    #[test]
    fn oversized_note_is_rejected() {
        let note = "x".repeat(MAX_NOTE_LEN + 1);
        assert!(validate_note(Some(&note)).is_err());
        assert!(validate_note(Some("ok")).is_ok());
        assert!(validate_note(None).is_ok());
    }

    #[test]
    fn patch_distinguishes_absent_and_null_note() {
        let patch: EntryPatch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(patch.note, Some(None));

        let patch: EntryPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.note, None);

        let patch: EntryPatch = serde_json::from_str(r#"{"note": "kept"}"#).unwrap();
        assert_eq!(patch.note, Some(Some("kept".to_string())));
    }

    async fn seeded_user(pool: &SqlitePool) -> Uuid {
        use db::models::user::{CreateUser, User, UserRole};

        User::create(
            pool,
            &CreateUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
                salt: "salt".to_string(),
                role: UserRole::Patient,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn list_pages_and_reports_total() {
        let db = db::DBService::new_in_memory().await.unwrap();
        let user_id = seeded_user(&db.pool).await;

        for i in 0..3 {
            EntryService::create(
                &db.pool,
                user_id,
                NewEntry {
                    emotion: "joy".to_string(),
                    intensity: Some(5 + i),
                    intensity_level: None,
                    note: None,
                    recorded_at: None,
                },
            )
            .await
            .unwrap();
        }

        let first = EntryService::list(&db.pool, user_id, 1, 2).await.unwrap();
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.total, 3);
        assert_eq!(first.page, 1);

        let second = EntryService::list(&db.pool, user_id, 2, 2).await.unwrap();
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.total, 3);
    }

    #[tokio::test]
    async fn explicit_null_clears_the_note() {
        let db = db::DBService::new_in_memory().await.unwrap();
        let user_id = seeded_user(&db.pool).await;

        let entry = EntryService::create(
            &db.pool,
            user_id,
            NewEntry {
                emotion: "calm".to_string(),
                intensity: Some(5),
                intensity_level: None,
                note: Some("rough morning".to_string()),
                recorded_at: None,
            },
        )
        .await
        .unwrap();

        // Absent note leaves the stored one untouched.
        let patch: EntryPatch = serde_json::from_str(r#"{"intensity": 6}"#).unwrap();
        let updated = EntryService::update(&db.pool, user_id, entry.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.note.as_deref(), Some("rough morning"));
        assert_eq!(updated.intensity, 6);

        let patch: EntryPatch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        let updated = EntryService::update(&db.pool, user_id, entry.id, patch)
            .await
            .unwrap();
        assert!(updated.note.is_none());
    }
}
