//! Feature target aggregation.

use super::selection::ConsideredEmotion;
use crate::emotion::{Emotion, ProfileTable};
use crate::features::{AudioFeature, FeatureTarget};

/// Blend the baselines of the considered emotions into one target.
///
/// Each feature is the weight-sum of the emotions' baselines, where an
/// emotion that leaves the feature undefined contributes 0. When none of the
/// considered emotions defines a feature, the neutral baseline is used
/// instead (or the feature's range midpoint if neutral leaves it undefined
/// too), so every feature is always present.
pub fn aggregate_target(profiles: &ProfileTable, considered: &[ConsideredEmotion]) -> FeatureTarget {
    FeatureTarget::from_fn(|feature| {
        let mut value = 0.0;
        let mut defined_weight = 0.0;

        for c in considered {
            if let Some(baseline) = profiles.get(c.emotion).baseline(feature) {
                value += c.weight * baseline;
                defined_weight += c.weight;
            }
        }

        if defined_weight > 0.0 {
            value
        } else {
            fallback(profiles, feature)
        }
    })
}

fn fallback(profiles: &ProfileTable, feature: AudioFeature) -> f32 {
    profiles
        .get(Emotion::Neutral)
        .baseline(feature)
        .unwrap_or_else(|| feature.midpoint())
}
