//! Aggregated statistics and pattern analysis over a user's entry history.

use chrono::{DateTime, Datelike, Utc, Weekday};
use db::models::emotion_entry::{Emotion, EmotionEntry};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::vocabulary::{self, IntensityLevel, Valence};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MoodSummary {
    pub total_entries: usize,
    /// Mean of the 1-10 scale, one decimal. 0.0 for an empty window.
    pub mean_intensity: f64,
    /// The mean expressed on the five-step scale. Absent for an empty window.
    pub mean_level: Option<IntensityLevel>,
    pub distribution: Vec<EmotionCount>,
    pub dominant_emotion: Option<Emotion>,
    /// Share of entries with positive valence, 0.0..=1.0.
    pub positive_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WeekdayStat {
    pub weekday: String,
    pub count: usize,
    pub mean_intensity: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MoodTrend {
    pub direction: TrendDirection,
    pub first_half_mean: f64,
    pub second_half_mean: f64,
    pub delta: f64,
}

/// Mean deltas below this read as noise.
const TREND_THRESHOLD: f64 = 0.5;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_intensity(entries: &[EmotionEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: i64 = entries.iter().map(|e| i64::from(e.intensity)).sum();
    round1(sum as f64 / entries.len() as f64)
}

/// Count, distribution and dominant emotion for a window of entries.
pub fn summarize(entries: &[EmotionEntry]) -> MoodSummary {
    let total = entries.len();

    let mut distribution: Vec<EmotionCount> = Emotion::ALL
        .iter()
        .filter_map(|&emotion| {
            let count = entries.iter().filter(|e| e.emotion == emotion).count();
            (count > 0).then(|| EmotionCount {
                emotion,
                count,
                percentage: round1(count as f64 * 100.0 / total as f64),
            })
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));

    // Ties break toward the emotion felt more strongly on average.
    let dominant_emotion = distribution
        .iter()
        .filter(|c| c.count == distribution.first().map_or(0, |f| f.count))
        .max_by(|a, b| {
            let mean_a = mean_for(entries, a.emotion);
            let mean_b = mean_for(entries, b.emotion);
            mean_a.total_cmp(&mean_b)
        })
        .map(|c| c.emotion);

    let positive = entries
        .iter()
        .filter(|e| vocabulary::valence(e.emotion) == Valence::Positive)
        .count();

    let mean = mean_intensity(entries);
    MoodSummary {
        total_entries: total,
        mean_intensity: mean,
        mean_level: (total > 0).then(|| vocabulary::level_for(mean.round() as i32)),
        distribution,
        dominant_emotion,
        positive_share: if total == 0 {
            0.0
        } else {
            round2(positive as f64 / total as f64)
        },
    }
}

fn mean_for(entries: &[EmotionEntry], emotion: Emotion) -> f64 {
    let matching: Vec<i64> = entries
        .iter()
        .filter(|e| e.emotion == emotion)
        .map(|e| i64::from(e.intensity))
        .collect();
    if matching.is_empty() {
        0.0
    } else {
        matching.iter().sum::<i64>() as f64 / matching.len() as f64
    }
}

/// Per-weekday count and mean intensity, Monday first.
pub fn weekday_profile(entries: &[EmotionEntry]) -> Vec<WeekdayStat> {
    const WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    WEEKDAYS
        .iter()
        .map(|&weekday| {
            let matching: Vec<&EmotionEntry> = entries
                .iter()
                .filter(|e| e.recorded_at.weekday() == weekday)
                .collect();
            let count = matching.len();
            let mean = if count == 0 {
                0.0
            } else {
                round1(
                    matching.iter().map(|e| i64::from(e.intensity)).sum::<i64>() as f64
                        / count as f64,
                )
            };
            WeekdayStat {
                weekday: weekday.to_string(),
                count,
                mean_intensity: mean,
            }
        })
        .collect()
}

/// Compare mean intensity across the two halves of the window.
/// Entries must already be sorted by `recorded_at` ascending.
pub fn trend(entries: &[EmotionEntry], from: DateTime<Utc>, to: DateTime<Utc>) -> MoodTrend {
    let midpoint = from + (to - from) / 2;
    let split = entries.partition_point(|e| e.recorded_at < midpoint);
    let (first, second) = entries.split_at(split);

    let first_half_mean = mean_intensity(first);
    let second_half_mean = mean_intensity(second);
    let delta = round1(second_half_mean - first_half_mean);

    let direction = if first.is_empty() || second.is_empty() || delta.abs() < TREND_THRESHOLD {
        TrendDirection::Stable
    } else if delta > 0.0 {
        TrendDirection::Improving
    } else {
        TrendDirection::Declining
    };

    MoodTrend {
        direction,
        first_half_mean,
        second_half_mean,
        delta,
    }
}

/// Clamp a `?days=N` query to a sane window ending now.
pub fn window(days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let to = Utc::now();
    (to - chrono::Duration::days(days.clamp(1, 365)), to)
}

pub struct StatsService;

impl StatsService {
    pub async fn summary(
        pool: &SqlitePool,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<MoodSummary, StatsError> {
        let entries = EmotionEntry::find_by_user_in_range(pool, user_id, from, to).await?;
        Ok(summarize(&entries))
    }

    pub async fn weekday_profile(
        pool: &SqlitePool,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WeekdayStat>, StatsError> {
        let entries = EmotionEntry::find_by_user_in_range(pool, user_id, from, to).await?;
        Ok(weekday_profile(&entries))
    }

    pub async fn trend(
        pool: &SqlitePool,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<MoodTrend, StatsError> {
        let entries = EmotionEntry::find_by_user_in_range(pool, user_id, from, to).await?;
        Ok(trend(&entries, from, to))
    }
}
