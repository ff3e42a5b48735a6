//! Input validation and top-N emotion selection.

use std::collections::HashSet;

use super::RecommendError;
use crate::emotion::{Emotion, EmotionScore};
use crate::math::normalize_weights;

/// An emotion that survived validation and truncation, with its
/// normalized contribution weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsideredEmotion {
    pub emotion: Emotion,
    pub probability: f32,
    pub weight: f32,
}

/// Validate scores and keep the `max_emotions` most probable ones.
///
/// Ordering is probability descending; equal probabilities fall back to
/// taxonomy declaration order, so the result does not depend on input order.
/// Weights are the kept probabilities normalized to sum to 1, or uniform if
/// they sum to zero.
///
/// # Errors
/// `InvalidInput` for an empty list, an unknown or duplicate label, or a
/// probability outside `[0, 1]` (including NaN).
pub fn select_considered(
    scores: &[EmotionScore],
    max_emotions: usize,
) -> Result<Vec<ConsideredEmotion>, RecommendError> {
    if scores.is_empty() {
        return Err(RecommendError::InvalidInput(
            "at least one emotion score is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(scores.len());
    let mut parsed = Vec::with_capacity(scores.len());

    for score in scores {
        let emotion = score
            .label
            .parse::<Emotion>()
            .map_err(|e| RecommendError::InvalidInput(e.to_string()))?;

        if !(0.0..=1.0).contains(&score.probability) {
            return Err(RecommendError::InvalidInput(format!(
                "probability for '{}' must be within [0, 1], got {}",
                score.label, score.probability
            )));
        }

        if !seen.insert(emotion) {
            return Err(RecommendError::InvalidInput(format!(
                "duplicate emotion label: {emotion}"
            )));
        }

        // Adding zero folds -0.0 into 0.0 so equal scores tie
        parsed.push((emotion, score.probability + 0.0));
    }

    parsed.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    parsed.truncate(max_emotions.max(1));

    let probabilities: Vec<f32> = parsed.iter().map(|(_, p)| *p).collect();
    let weights = normalize_weights(&probabilities);

    Ok(parsed
        .into_iter()
        .zip(weights)
        .map(|((emotion, probability), weight)| ConsideredEmotion {
            emotion,
            probability,
            weight,
        })
        .collect())
}
