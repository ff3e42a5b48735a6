//! Audio-feature space used as the recommendation target.
//!
//! Every point in this space covers the full set of [`AudioFeature`]s, with
//! each value clamped to the feature's valid range.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Audio features a recommendation target is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFeature {
    /// Musical positiveness (0 = sad, 1 = happy)
    Valence,
    /// Perceived intensity and activity
    Energy,
    /// Suitability for dancing
    Danceability,
    /// Confidence the track is acoustic
    Acousticness,
    /// Likelihood the track has no vocals
    Instrumentalness,
    /// Beats per minute
    Tempo,
}

impl AudioFeature {
    /// All features in declaration order
    pub const ALL: [AudioFeature; 6] = [
        AudioFeature::Valence,
        AudioFeature::Energy,
        AudioFeature::Danceability,
        AudioFeature::Acousticness,
        AudioFeature::Instrumentalness,
        AudioFeature::Tempo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFeature::Valence => "valence",
            AudioFeature::Energy => "energy",
            AudioFeature::Danceability => "danceability",
            AudioFeature::Acousticness => "acousticness",
            AudioFeature::Instrumentalness => "instrumentalness",
            AudioFeature::Tempo => "tempo",
        }
    }

    /// Inclusive valid range for this feature
    pub fn range(&self) -> (f32, f32) {
        match self {
            AudioFeature::Tempo => (50.0, 200.0),
            _ => (0.0, 1.0),
        }
    }

    /// Width of the valid range
    pub fn span(&self) -> f32 {
        let (min, max) = self.range();
        max - min
    }

    /// Center of the valid range
    pub fn midpoint(&self) -> f32 {
        let (min, max) = self.range();
        (min + max) / 2.0
    }

    /// Clamp a value into the valid range. NaN maps to the range midpoint.
    pub fn clamp_value(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.midpoint();
        }
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    pub fn contains(&self, value: f32) -> bool {
        let (min, max) = self.range();
        value >= min && value <= max
    }
}

impl std::fmt::Display for AudioFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AudioFeature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown audio feature: {s}"))
    }
}

/// A point in audio-feature space.
///
/// Constructed through [`FeatureTarget::from_fn`], which guarantees every
/// feature is present and within range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTarget(BTreeMap<AudioFeature, f32>);

impl FeatureTarget {
    /// Build a target by evaluating `value` for every feature, clamping each result
    pub fn from_fn(mut value: impl FnMut(AudioFeature) -> f32) -> Self {
        Self(
            AudioFeature::ALL
                .into_iter()
                .map(|feature| (feature, feature.clamp_value(value(feature))))
                .collect(),
        )
    }

    /// Value for a feature (range midpoint if absent, which only happens for
    /// targets deserialized from foreign payloads)
    pub fn get(&self, feature: AudioFeature) -> f32 {
        self.0
            .get(&feature)
            .copied()
            .unwrap_or_else(|| feature.midpoint())
    }

    pub fn iter(&self) -> impl Iterator<Item = (AudioFeature, f32)> + '_ {
        self.0.iter().map(|(f, v)| (*f, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
