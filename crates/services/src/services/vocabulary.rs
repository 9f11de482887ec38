//! Normalization between the numeric intensity scale, enumerated levels,
//! and the bilingual emotion vocabulary.
//!
//! The mobile client historically sent three shapes for the same concept:
//! a 1-10 number, a five-step level, and Spanish emotion names. Everything
//! is normalized here before it reaches storage.

use db::models::emotion_entry::Emotion;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Five-step intensity scale accepted as an alternative to the 1-10 number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntensityLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

/// Coarse valence grouping used by stats and the rule-based insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valence {
    Positive,
    Negative,
}

/// Map a validated 1..=10 intensity onto its level.
pub fn level_for(intensity: i32) -> IntensityLevel {
    match intensity {
        i32::MIN..=2 => IntensityLevel::VeryLow,
        3..=4 => IntensityLevel::Low,
        5..=6 => IntensityLevel::Moderate,
        7..=8 => IntensityLevel::High,
        _ => IntensityLevel::VeryHigh,
    }
}

/// Representative numeric value for a level, for clients that send levels.
pub fn midpoint(level: IntensityLevel) -> i32 {
    match level {
        IntensityLevel::VeryLow => 2,
        IntensityLevel::Low => 4,
        IntensityLevel::Moderate => 6,
        IntensityLevel::High => 8,
        IntensityLevel::VeryHigh => 10,
    }
}

pub fn valence(emotion: Emotion) -> Valence {
    match emotion {
        Emotion::Joy | Emotion::Calm | Emotion::Surprise => Valence::Positive,
        Emotion::Sadness | Emotion::Anger | Emotion::Fear | Emotion::Disgust | Emotion::Anxiety => {
            Valence::Negative
        }
    }
}

/// Parse an emotion name in either vocabulary, case- and accent-insensitive.
pub fn parse_emotion(input: &str) -> Option<Emotion> {
    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect();

    match normalized.as_str() {
        "joy" | "alegria" => Some(Emotion::Joy),
        "sadness" | "tristeza" => Some(Emotion::Sadness),
        "anger" | "ira" | "enojo" => Some(Emotion::Anger),
        "fear" | "miedo" => Some(Emotion::Fear),
        "surprise" | "sorpresa" => Some(Emotion::Surprise),
        "disgust" | "asco" => Some(Emotion::Disgust),
        "calm" | "calma" => Some(Emotion::Calm),
        "anxiety" | "ansiedad" => Some(Emotion::Anxiety),
        _ => None,
    }
}

/// Localized display name for prompts and doctor-facing summaries.
pub fn spanish_name(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Joy => "alegría",
        Emotion::Sadness => "tristeza",
        Emotion::Anger => "ira",
        Emotion::Fear => "miedo",
        Emotion::Surprise => "sorpresa",
        Emotion::Disgust => "asco",
        Emotion::Calm => "calma",
        Emotion::Anxiety => "ansiedad",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_cover_the_numeric_scale() {
        assert_eq!(level_for(1), IntensityLevel::VeryLow);
        assert_eq!(level_for(2), IntensityLevel::VeryLow);
        assert_eq!(level_for(3), IntensityLevel::Low);
        assert_eq!(level_for(5), IntensityLevel::Moderate);
        assert_eq!(level_for(8), IntensityLevel::High);
        assert_eq!(level_for(9), IntensityLevel::VeryHigh);
        assert_eq!(level_for(10), IntensityLevel::VeryHigh);
    }

    #[test]
    fn midpoints_round_trip_to_the_same_level() {
        for level in [
            IntensityLevel::VeryLow,
            IntensityLevel::Low,
            IntensityLevel::Moderate,
            IntensityLevel::High,
            IntensityLevel::VeryHigh,
        ] {
            assert_eq!(level_for(midpoint(level)), level);
        }
    }

    #[test]
    fn parses_english_vocabulary() {
        assert_eq!(parse_emotion("Joy"), Some(Emotion::Joy));
        assert_eq!(parse_emotion("  anxiety "), Some(Emotion::Anxiety));
        assert_eq!(parse_emotion("melancholy"), None);
    }

    #[test]
    fn parses_spanish_vocabulary_accent_insensitive() {
        assert_eq!(parse_emotion("alegría"), Some(Emotion::Joy));
        assert_eq!(parse_emotion("alegria"), Some(Emotion::Joy));
        assert_eq!(parse_emotion("ENOJO"), Some(Emotion::Anger));
        assert_eq!(parse_emotion("tristeza"), Some(Emotion::Sadness));
    }

    #[test]
    fn every_emotion_has_a_valence_and_spanish_name() {
        for emotion in Emotion::ALL {
            let _ = valence(emotion);
            assert!(!spanish_name(emotion).is_empty());
            assert_eq!(parse_emotion(spanish_name(emotion)), Some(emotion));
        }
    }
}
