//! AI-assisted recommendations with a rule-based fallback.
//!
//! The LLM path is best-effort: any upstream failure falls back to the
//! rules, so this endpoint never breaks because the model is down.

use chrono::{Duration, Utc};
use db::models::emotion_entry::EmotionEntry;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    llm::LlmClient,
    stats::{self, MoodSummary, MoodTrend, TrendDirection},
    vocabulary::{self, Valence},
};

pub const DEFAULT_WINDOW_DAYS: i64 = 14;

/// Mean intensity at or above this on a dominant negative emotion gets the
/// acute suggestion set.
const ACUTE_INTENSITY: f64 = 7.0;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Ai,
    Rules,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Insight {
    pub headline: String,
    pub observations: Vec<String>,
    pub suggestions: Vec<String>,
    pub source: InsightSource,
}

/// Shape the model is asked to reply with.
#[derive(Debug, Deserialize)]
struct GeneratedInsight {
    headline: String,
    observations: Vec<String>,
    suggestions: Vec<String>,
}

pub struct InsightService {
    llm: Option<LlmClient>,
}

impl InsightService {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        pool: &SqlitePool,
        user_id: Uuid,
        days: i64,
    ) -> Result<Insight, InsightError> {
        let days = days.clamp(1, 90);
        let to = Utc::now();
        let from = to - Duration::days(days);

        let entries = EmotionEntry::find_by_user_in_range(pool, user_id, from, to).await?;
        let summary = stats::summarize(&entries);
        let trend = stats::trend(&entries, from, to);

        if let Some(llm) = &self.llm {
            match self.ask_model(llm, &entries, &summary, &trend, days).await {
                Ok(insight) => return Ok(insight),
                Err(e) => {
                    warn!(%user_id, error = %e, "LLM insight failed, using rule-based fallback");
                }
            }
        }

        Ok(rule_based_insight(&summary, &trend))
    }

    async fn ask_model(
        &self,
        llm: &LlmClient,
        entries: &[EmotionEntry],
        summary: &MoodSummary,
        trend: &MoodTrend,
        days: i64,
    ) -> Result<Insight, super::llm::LlmError> {
        let prompt = build_prompt(entries, summary, trend, days);
        let system = Some(
            "You are a supportive mental wellness assistant reviewing a user's mood log. \
             You are not a clinician and must not diagnose. Be warm, specific and brief. \
             Output valid JSON only."
                .to_string(),
        );

        let generated: GeneratedInsight = llm.ask_json(&prompt, system).await?;
        Ok(Insight {
            headline: generated.headline,
            observations: generated.observations,
            suggestions: generated.suggestions,
            source: InsightSource::Ai,
        })
    }
}

fn build_prompt(
    entries: &[EmotionEntry],
    summary: &MoodSummary,
    trend: &MoodTrend,
    days: i64,
) -> String {
    let mut prompt = format!(
        "Review this mood log covering the last {days} days.\n\n\
         ## Aggregates\n\
         - entries: {}\n\
         - mean intensity (1-10): {}\n\
         - positive share: {}\n\
         - trend: {:?} (first half {} -> second half {})\n",
        summary.total_entries,
        summary.mean_intensity,
        summary.positive_share,
        trend.direction,
        trend.first_half_mean,
        trend.second_half_mean,
    );

    if let Some(dominant) = summary.dominant_emotion {
        prompt.push_str(&format!(
            "- dominant emotion: {dominant} ({})\n",
            vocabulary::spanish_name(dominant)
        ));
    }

    prompt.push_str("\n## Most recent entries\n");
    for entry in entries.iter().rev().take(10) {
        prompt.push_str(&format!(
            "- {} {} intensity {}{}\n",
            entry.recorded_at.format("%Y-%m-%d"),
            entry.emotion,
            entry.intensity,
            entry
                .note
                .as_deref()
                .map(|n| format!(" note: {n}"))
                .unwrap_or_default(),
        ));
    }

    prompt.push_str(
        "\n## Output format\n\
         Return ONLY valid JSON:\n\
         ```json\n\
         {\n\
           \"headline\": \"One-sentence takeaway\",\n\
           \"observations\": [\"2-4 concrete patterns you see\"],\n\
           \"suggestions\": [\"2-4 gentle, actionable suggestions\"]\n\
         }\n\
         ```\n",
    );

    prompt
}

/// Deterministic fallback. Never fails.
fn rule_based_insight(summary: &MoodSummary, trend: &MoodTrend) -> Insight {
    if summary.total_entries == 0 {
        return Insight {
            headline: "No entries yet in this period".to_string(),
            observations: vec!["There is nothing logged in the selected window.".to_string()],
            suggestions: vec![
                "Log how you feel once a day, even briefly.".to_string(),
                "A daily reminder at a fixed time makes logging stick.".to_string(),
            ],
            source: InsightSource::Rules,
        };
    }

    let mut observations = Vec::new();
    let mut suggestions = Vec::new();

    let acute_negative = summary.dominant_emotion.filter(|&e| {
        vocabulary::valence(e) == Valence::Negative && summary.mean_intensity >= ACUTE_INTENSITY
    });

    let headline = if let Some(emotion) = acute_negative {
        observations.push(format!(
            "{emotion} has dominated your log at high intensity (mean {}).",
            summary.mean_intensity
        ));
        suggestions.push("Consider talking to someone you trust about how you feel.".to_string());
        suggestions.push(
            "Grounding exercises or a short walk can take the edge off intense moments."
                .to_string(),
        );
        suggestions.push(
            "If this persists, reaching out to a professional is a sign of strength.".to_string(),
        );
        format!("Strong {emotion} lately; be kind to yourself")
    } else if trend.direction == TrendDirection::Declining {
        observations.push(format!(
            "Your mood intensity dropped from {} to {} across the period.",
            trend.first_half_mean, trend.second_half_mean
        ));
        suggestions.push("Look at what changed recently; small routines matter.".to_string());
        suggestions.push("Prioritize sleep and time outside this week.".to_string());
        "Your mood has been trending down".to_string()
    } else {
        if let Some(dominant) = summary.dominant_emotion {
            observations.push(format!("{dominant} was your most frequent emotion."));
        }
        suggestions.push("Keep logging daily to sharpen your patterns.".to_string());
        if summary.positive_share >= 0.5 {
            suggestions.push("Note what went right on good days so you can repeat it.".to_string());
            "A mostly steady, positive period".to_string()
        } else {
            suggestions.push(
                "Try pairing difficult moments with one small restorative activity.".to_string(),
            );
            "A steady period with some rough patches".to_string()
        }
    };

    observations.push(format!(
        "{} entries logged with a mean intensity of {}.",
        summary.total_entries, summary.mean_intensity
    ));

    Insight {
        headline,
        observations,
        suggestions,
        source: InsightSource::Rules,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use db::models::emotion_entry::Emotion;

    use super::*;

    fn entry(emotion: Emotion, intensity: i32, day: u32) -> EmotionEntry {
        let at = Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap();
        EmotionEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            emotion,
            intensity,
            note: None,
            recorded_at: at,
            created_at: at,
            updated_at: at,
        }
    }

    fn summary_and_trend(entries: &[EmotionEntry]) -> (MoodSummary, MoodTrend) {
        let from = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        (stats::summarize(entries), stats::trend(entries, from, to))
    }

    #[test]
    fn empty_window_gets_onboarding_nudge() {
        let (summary, trend) = summary_and_trend(&[]);
        let insight = rule_based_insight(&summary, &trend);
        assert_eq!(insight.source, InsightSource::Rules);
        assert!(insight.headline.contains("No entries"));
    }

    #[test]
    fn acute_negative_dominant_gets_acute_suggestions() {
        let entries = [
            entry(Emotion::Anxiety, 9, 2),
            entry(Emotion::Anxiety, 8, 3),
            entry(Emotion::Joy, 6, 4),
        ];
        let (summary, trend) = summary_and_trend(&entries);
        let insight = rule_based_insight(&summary, &trend);
        assert!(insight.headline.contains("anxiety"));
        assert!(insight.suggestions.len() >= 3);
    }

    #[test]
    fn declining_trend_gets_trend_warning() {
        let entries = [
            entry(Emotion::Joy, 8, 2),
            entry(Emotion::Joy, 8, 3),
            entry(Emotion::Sadness, 3, 12),
            entry(Emotion::Sadness, 3, 13),
        ];
        let (summary, trend) = summary_and_trend(&entries);
        assert_eq!(trend.direction, TrendDirection::Declining);
        let insight = rule_based_insight(&summary, &trend);
        assert!(insight.headline.contains("trending down"));
    }

    #[test]
    fn steady_positive_period() {
        let entries = [
            entry(Emotion::Calm, 6, 2),
            entry(Emotion::Joy, 7, 8),
            entry(Emotion::Calm, 6, 12),
        ];
        let (summary, trend) = summary_and_trend(&entries);
        let insight = rule_based_insight(&summary, &trend);
        assert_eq!(insight.source, InsightSource::Rules);
        assert!(insight.headline.contains("positive"));
    }

    #[test]
    fn prompt_includes_aggregates_and_recent_entries() {
        let entries = [entry(Emotion::Fear, 7, 2), entry(Emotion::Calm, 5, 3)];
        let (summary, trend) = summary_and_trend(&entries);
        let prompt = build_prompt(&entries, &summary, &trend, 14);
        assert!(prompt.contains("mean intensity"));
        assert!(prompt.contains("2025-03-03 calm intensity 5"));
        assert!(prompt.contains("valid JSON"));
    }
}
