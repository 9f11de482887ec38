pub mod models;

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

/// Shared database handle. Connects the pool and applies embedded migrations.
#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(database_url, "database ready");
        Ok(Self { pool })
    }

    /// In-memory database for tests. Pinned to a single connection so every
    /// query sees the same memory database.
    pub async fn new_in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::{
        emotion_entry::{CreateEmotionEntry, Emotion, EmotionEntry, UpdateEmotionEntry},
        streak::Streak,
        user::{CreateUser, User, UserRole},
    };

    async fn test_user(pool: &SqlitePool, username: &str) -> User {
        User::create(
            pool,
            &CreateUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                salt: "salt".to_string(),
                role: UserRole::Patient,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch_user() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = test_user(&db.pool, "alice").await;

        let found = User::find_by_username(&db.pool, "alice").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(
            User::find_by_id(&db.pool, Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn entry_crud_is_owner_scoped() {
        let db = DBService::new_in_memory().await.unwrap();
        let alice = test_user(&db.pool, "alice").await;
        let bob = test_user(&db.pool, "bob").await;

        let entry = EmotionEntry::create(
            &db.pool,
            &CreateEmotionEntry {
                user_id: alice.id,
                emotion: Emotion::Joy,
                intensity: 7,
                note: Some("good day".to_string()),
                recorded_at: Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap(),
            },
        )
        .await
        .unwrap();

        // Bob cannot see or delete Alice's entry.
        assert!(
            EmotionEntry::find_for_user(&db.pool, entry.id, bob.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            EmotionEntry::delete(&db.pool, entry.id, bob.id).await.unwrap(),
            0
        );
        assert_eq!(
            EmotionEntry::delete(&db.pool, entry.id, alice.id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn update_note_semantics_and_counts() {
        let db = DBService::new_in_memory().await.unwrap();
        let alice = test_user(&db.pool, "alice").await;

        let entry = EmotionEntry::create(
            &db.pool,
            &CreateEmotionEntry {
                user_id: alice.id,
                emotion: Emotion::Fear,
                intensity: 6,
                note: Some("before the exam".to_string()),
                recorded_at: Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();

        assert_eq!(EmotionEntry::count_by_user(&db.pool, alice.id).await.unwrap(), 1);
        assert_eq!(
            EmotionEntry::count_by_user(&db.pool, Uuid::new_v4())
                .await
                .unwrap(),
            0
        );

        // None leaves the note, Some(None) clears it, Some(Some) replaces it.
        let patch = |note| UpdateEmotionEntry {
            emotion: None,
            intensity: None,
            note,
        };

        let kept = EmotionEntry::update(&db.pool, entry.id, alice.id, &patch(None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.note.as_deref(), Some("before the exam"));

        let cleared = EmotionEntry::update(&db.pool, entry.id, alice.id, &patch(Some(None)))
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.note.is_none());

        let replaced = EmotionEntry::update(
            &db.pool,
            entry.id,
            alice.id,
            &patch(Some(Some("went fine".to_string()))),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(replaced.note.as_deref(), Some("went fine"));
    }

    #[tokio::test]
    async fn distinct_dates_deduplicate_same_day() {
        let db = DBService::new_in_memory().await.unwrap();
        let alice = test_user(&db.pool, "alice").await;

        for hour in [8, 20] {
            EmotionEntry::create(
                &db.pool,
                &CreateEmotionEntry {
                    user_id: alice.id,
                    emotion: Emotion::Calm,
                    intensity: 5,
                    note: None,
                    recorded_at: Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap(),
                },
            )
            .await
            .unwrap();
        }

        let dates = EmotionEntry::distinct_entry_dates(&db.pool, alice.id)
            .await
            .unwrap();
        assert_eq!(dates.len(), 1);
    }

    #[tokio::test]
    async fn streak_upsert_replaces_row() {
        let db = DBService::new_in_memory().await.unwrap();
        let alice = test_user(&db.pool, "alice").await;

        let day = chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        Streak::upsert(&db.pool, alice.id, 1, 1, Some(day)).await.unwrap();
        let updated = Streak::upsert(&db.pool, alice.id, 2, 5, Some(day))
            .await
            .unwrap();

        assert_eq!(updated.current_len, 2);
        assert_eq!(updated.longest_len, 5);
        assert_eq!(updated.last_entry_date, Some(day));
    }
}
