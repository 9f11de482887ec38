use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Per-user streak of consecutive days with at least one entry.
/// One row per user; `longest_len` is a high-water mark.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Streak {
    pub user_id: Uuid,
    pub current_len: i32,
    pub longest_len: i32,
    pub last_entry_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl Streak {
    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT user_id, current_len, longest_len, last_entry_date, updated_at
             FROM streaks WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn upsert(
        pool: &SqlitePool,
        user_id: Uuid,
        current_len: i32,
        longest_len: i32,
        last_entry_date: Option<NaiveDate>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO streaks (user_id, current_len, longest_len, last_entry_date, updated_at)
             VALUES ($1, $2, $3, $4, CURRENT_TIMESTAMP)
             ON CONFLICT(user_id) DO UPDATE SET
                 current_len = excluded.current_len,
                 longest_len = excluded.longest_len,
                 last_entry_date = excluded.last_entry_date,
                 updated_at = CURRENT_TIMESTAMP
             RETURNING user_id, current_len, longest_len, last_entry_date, updated_at",
        )
        .bind(user_id)
        .bind(current_len)
        .bind(longest_len)
        .bind(last_entry_date)
        .fetch_one(pool)
        .await
    }
}
