use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Canonical emotion vocabulary. Stored lowercase.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "emotion", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Calm,
    Anxiety,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disgust,
        Emotion::Calm,
        Emotion::Anxiety,
    ];
}

/// A single logged emotional state.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct EmotionEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub emotion: Emotion,
    /// Canonical numeric scale, 1..=10.
    pub intensity: i32,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateEmotionEntry {
    pub user_id: Uuid,
    pub emotion: Emotion,
    pub intensity: i32,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpdateEmotionEntry {
    pub emotion: Option<Emotion>,
    pub intensity: Option<i32>,
    /// `Some(None)` clears the note; `None` leaves it unchanged.
    pub note: Option<Option<String>>,
}

const ENTRY_COLUMNS: &str =
    "id, user_id, emotion, intensity, note, recorded_at, created_at, updated_at";

impl EmotionEntry {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateEmotionEntry,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO emotion_entries (id, user_id, emotion, intensity, note, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(id)
        .bind(data.user_id)
        .bind(data.emotion)
        .bind(data.intensity)
        .bind(&data.note)
        .bind(data.recorded_at)
        .fetch_one(pool)
        .await
    }

    /// Scoped by owner so a foreign id reads as missing.
    pub async fn find_for_user(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM emotion_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM emotion_entries
             WHERE user_id = $1
             ORDER BY recorded_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Entries with `recorded_at` in the half-open window `[from, to)`.
    pub async fn find_by_user_in_range(
        pool: &SqlitePool,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM emotion_entries
             WHERE user_id = $1 AND recorded_at >= $2 AND recorded_at < $3
             ORDER BY recorded_at ASC"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
        data: &UpdateEmotionEntry,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE emotion_entries
             SET emotion = COALESCE($3, emotion),
                 intensity = COALESCE($4, intensity),
                 note = CASE WHEN $6 THEN $5 ELSE note END,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND user_id = $2
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(data.emotion)
        .bind(data.intensity)
        .bind(data.note.as_ref().and_then(|n| n.as_deref()))
        .bind(data.note.is_some())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM emotion_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM emotion_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Distinct UTC dates with at least one entry, oldest first. Drives streak rebuilds.
    pub async fn distinct_entry_dates(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT date(recorded_at) FROM emotion_entries
             WHERE user_id = $1
             ORDER BY 1 ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
