//! Closed emotion taxonomy and per-emotion audio profiles.
//!
//! The 28 labels follow the GoEmotions label set. Declaration order matters:
//! it is the deterministic tie-break whenever two emotions carry the same
//! probability.

pub mod profiles;

pub use profiles::{EmotionProfile, ProfileError, ProfileTable};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single emotion category from the fixed taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Admiration,
    Amusement,
    Anger,
    Annoyance,
    Approval,
    Caring,
    Confusion,
    Curiosity,
    Desire,
    Disappointment,
    Disapproval,
    Disgust,
    Embarrassment,
    Excitement,
    Fear,
    Gratitude,
    Grief,
    Joy,
    Love,
    Nervousness,
    Optimism,
    Pride,
    Realization,
    Relief,
    Remorse,
    Sadness,
    Surprise,
    Neutral,
}

impl Emotion {
    /// Number of labels in the taxonomy
    pub const COUNT: usize = 28;

    /// All labels in declaration order
    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Admiration,
        Emotion::Amusement,
        Emotion::Anger,
        Emotion::Annoyance,
        Emotion::Approval,
        Emotion::Caring,
        Emotion::Confusion,
        Emotion::Curiosity,
        Emotion::Desire,
        Emotion::Disappointment,
        Emotion::Disapproval,
        Emotion::Disgust,
        Emotion::Embarrassment,
        Emotion::Excitement,
        Emotion::Fear,
        Emotion::Gratitude,
        Emotion::Grief,
        Emotion::Joy,
        Emotion::Love,
        Emotion::Nervousness,
        Emotion::Optimism,
        Emotion::Pride,
        Emotion::Realization,
        Emotion::Relief,
        Emotion::Remorse,
        Emotion::Sadness,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// Position in the taxonomy (also the tie-break rank)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Admiration => "admiration",
            Emotion::Amusement => "amusement",
            Emotion::Anger => "anger",
            Emotion::Annoyance => "annoyance",
            Emotion::Approval => "approval",
            Emotion::Caring => "caring",
            Emotion::Confusion => "confusion",
            Emotion::Curiosity => "curiosity",
            Emotion::Desire => "desire",
            Emotion::Disappointment => "disappointment",
            Emotion::Disapproval => "disapproval",
            Emotion::Disgust => "disgust",
            Emotion::Embarrassment => "embarrassment",
            Emotion::Excitement => "excitement",
            Emotion::Fear => "fear",
            Emotion::Gratitude => "gratitude",
            Emotion::Grief => "grief",
            Emotion::Joy => "joy",
            Emotion::Love => "love",
            Emotion::Nervousness => "nervousness",
            Emotion::Optimism => "optimism",
            Emotion::Pride => "pride",
            Emotion::Realization => "realization",
            Emotion::Relief => "relief",
            Emotion::Remorse => "remorse",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not part of the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// A labeled probability as produced by the emotion classifier.
///
/// The label is kept as a raw string so that unknown labels can be rejected
/// explicitly by the recommendation engine rather than at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub probability: f32,
}

impl EmotionScore {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

impl From<(Emotion, f32)> for EmotionScore {
    fn from((emotion, probability): (Emotion, f32)) -> Self {
        Self::new(emotion.as_str(), probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_size_and_order() {
        assert_eq!(Emotion::ALL.len(), 28);
        for (i, emotion) in Emotion::ALL.iter().enumerate() {
            assert_eq!(emotion.index(), i);
        }
        assert_eq!(Emotion::ALL[0], Emotion::Admiration);
        assert_eq!(Emotion::ALL[27], Emotion::Neutral);
    }

    #[test]
    fn test_parse_roundtrip() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.as_str().parse::<Emotion>().unwrap(), emotion);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "unknown_tag".parse::<Emotion>().unwrap_err();
        assert_eq!(err, UnknownEmotion("unknown_tag".to_string()));
        // Labels are case-sensitive
        assert!("Joy".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&Emotion::Disappointment).unwrap();
        assert_eq!(json, "\"disappointment\"");
    }

    #[test]
    fn test_score_from_tuple() {
        let score: EmotionScore = (Emotion::Joy, 0.8).into();
        assert_eq!(score.label, "joy");
        assert_eq!(score.probability, 0.8);
    }
}
