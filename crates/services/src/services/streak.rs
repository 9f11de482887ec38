//! Streak tracking: consecutive UTC days with at least one mood entry.

use chrono::{Days, NaiveDate};
use db::models::streak::Streak;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StreakError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of logging on `today` relative to the last logged day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakTransition {
    /// First entry ever: streak becomes 1.
    Started,
    /// Another entry on the same day: no change.
    Unchanged,
    /// Entry on the day after the last one: streak grows by 1.
    Extended,
    /// Gap of two or more days (or a clock that went backwards): back to 1.
    Reset,
}

/// Decide how a streak moves when an entry lands on `today`.
pub fn advance(last: Option<NaiveDate>, today: NaiveDate) -> StreakTransition {
    let Some(last) = last else {
        return StreakTransition::Started;
    };
    if today == last {
        StreakTransition::Unchanged
    } else if last.checked_add_days(Days::new(1)) == Some(today) {
        StreakTransition::Extended
    } else {
        StreakTransition::Reset
    }
}

/// Recompute current and longest run from the sorted distinct entry dates.
/// The current run is the one ending at the most recent entry date.
pub fn compute_runs(dates: &[NaiveDate]) -> (i32, i32) {
    let mut longest = 0i32;
    let mut run = 0i32;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        run = match prev {
            Some(p) if p.checked_add_days(Days::new(1)) == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    (run, longest)
}

pub struct StreakService;

impl StreakService {
    /// Apply one logged day to the stored streak and return the updated row.
    pub async fn record_entry_day(
        pool: &SqlitePool,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Streak, StreakError> {
        let existing = Streak::find_by_user(pool, user_id).await?;
        let (last, current, longest) = match &existing {
            Some(s) => (s.last_entry_date, s.current_len, s.longest_len),
            None => (None, 0, 0),
        };

        let transition = advance(last, day);
        let new_current = match transition {
            StreakTransition::Started | StreakTransition::Reset => 1,
            StreakTransition::Unchanged => current,
            StreakTransition::Extended => current + 1,
        };
        let new_longest = longest.max(new_current);

        debug!(%user_id, ?transition, new_current, "streak advanced");

        let last_date = match transition {
            // A backwards clock keeps the newer stored date.
            StreakTransition::Unchanged => last,
            _ => Some(last.map_or(day, |l| l.max(day))),
        };

        Ok(Streak::upsert(pool, user_id, new_current, new_longest, last_date).await?)
    }

    /// Rebuild both lengths from scratch. Used after an entry delete, where
    /// the incremental transition cannot run backwards.
    pub async fn rebuild(pool: &SqlitePool, user_id: Uuid) -> Result<Streak, StreakError> {
        let dates = db::models::emotion_entry::EmotionEntry::distinct_entry_dates(pool, user_id)
            .await?;
        let (current, longest) = compute_runs(&dates);
        let last = dates.last().copied();
        Ok(Streak::upsert(pool, user_id, current, longest, last).await?)
    }

    pub async fn get(pool: &SqlitePool, user_id: Uuid) -> Result<Streak, StreakError> {
        match Streak::find_by_user(pool, user_id).await? {
            Some(streak) => Ok(streak),
            // No row yet reads as an empty streak rather than a 404.
            None => Ok(Streak::upsert(pool, user_id, 0, 0, None).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_entry_starts_a_streak() {
        assert_eq!(advance(None, d(2025, 3, 10)), StreakTransition::Started);
    }

    #[test]
    fn same_day_leaves_streak_unchanged() {
        assert_eq!(
            advance(Some(d(2025, 3, 10)), d(2025, 3, 10)),
            StreakTransition::Unchanged
        );
    }

    #[test]
    fn next_day_extends() {
        assert_eq!(
            advance(Some(d(2025, 3, 10)), d(2025, 3, 11)),
            StreakTransition::Extended
        );
    }

    #[test]
    fn month_boundary_extends() {
        assert_eq!(
            advance(Some(d(2025, 2, 28)), d(2025, 3, 1)),
            StreakTransition::Extended
        );
        // Leap year: Feb 28 -> Mar 1 is a gap.
        assert_eq!(
            advance(Some(d(2024, 2, 28)), d(2024, 3, 1)),
            StreakTransition::Reset
        );
        assert_eq!(
            advance(Some(d(2024, 2, 29)), d(2024, 3, 1)),
            StreakTransition::Extended
        );
    }

    #[test]
    fn gap_resets() {
        assert_eq!(
            advance(Some(d(2025, 3, 10)), d(2025, 3, 12)),
            StreakTransition::Reset
        );
    }

    #[test]
    fn backwards_clock_resets() {
        assert_eq!(
            advance(Some(d(2025, 3, 10)), d(2025, 3, 9)),
            StreakTransition::Reset
        );
    }

    #[test]
    fn compute_runs_empty() {
        assert_eq!(compute_runs(&[]), (0, 0));
    }

    #[test]
    fn compute_runs_finds_current_and_longest() {
        // Runs: 3 days, gap, 2 days. Current = trailing run.
        let dates = [
            d(2025, 3, 1),
            d(2025, 3, 2),
            d(2025, 3, 3),
            d(2025, 3, 7),
            d(2025, 3, 8),
        ];
        assert_eq!(compute_runs(&dates), (2, 3));
    }

    #[test]
    fn compute_runs_single_day() {
        assert_eq!(compute_runs(&[d(2025, 3, 1)]), (1, 1));
    }
}
