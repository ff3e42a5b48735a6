//! Baseline audio profiles and discovery seeds for every emotion.
//!
//! Valence, energy and danceability baselines are the midpoints of the
//! per-emotion ranges the recommender was tuned with; acousticness,
//! instrumentalness and tempo extend the same table. The table can be
//! overridden per emotion from a TOML or JSON file at startup, after which it
//! is validated again and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::Emotion;
use crate::features::AudioFeature;

/// Errors raised while building or validating a profile table
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("No profile defined for emotion: {0}")]
    Missing(Emotion),

    #[error("Emotion defined more than once: {0}")]
    Duplicate(Emotion),

    #[error("Baseline {feature} for {emotion} out of range: {value}")]
    OutOfRange {
        emotion: Emotion,
        feature: AudioFeature,
        value: f32,
    },

    #[error("Emotion {0} has no seed candidates")]
    NoSeeds(Emotion),

    #[error("Unknown emotion label in profile overrides: {0}")]
    UnknownLabel(String),

    #[error("Unknown audio feature for {emotion}: {feature}")]
    UnknownFeature { emotion: Emotion, feature: String },

    #[error("Failed to load profile overrides: {0}")]
    Load(String),
}

/// Compact compile-time profile definition
struct BuiltinProfile {
    emotion: Emotion,
    valence: f32,
    energy: f32,
    danceability: f32,
    acousticness: f32,
    instrumentalness: f32,
    tempo: f32,
    genres: &'static [&'static str],
}

// ============================================================================
// Built-in profiles (one per taxonomy label, declaration order)
// ============================================================================

const BUILTIN_PROFILES: [BuiltinProfile; Emotion::COUNT] = [
    BuiltinProfile {
        emotion: Emotion::Admiration,
        valence: 0.725,
        energy: 0.525,
        danceability: 0.575,
        acousticness: 0.55,
        instrumentalness: 0.20,
        tempo: 100.0,
        genres: &["classical", "jazz", "singer-songwriter", "acoustic"],
    },
    BuiltinProfile {
        emotion: Emotion::Amusement,
        valence: 0.80,
        energy: 0.625,
        danceability: 0.725,
        acousticness: 0.25,
        instrumentalness: 0.05,
        tempo: 118.0,
        genres: &["pop", "indie-pop", "k-pop", "funk"],
    },
    BuiltinProfile {
        emotion: Emotion::Anger,
        valence: 0.15,
        energy: 0.825,
        danceability: 0.525,
        acousticness: 0.05,
        instrumentalness: 0.10,
        tempo: 150.0,
        genres: &["metal", "hard-rock", "punk", "industrial"],
    },
    BuiltinProfile {
        emotion: Emotion::Annoyance,
        valence: 0.20,
        energy: 0.625,
        danceability: 0.425,
        acousticness: 0.15,
        instrumentalness: 0.10,
        tempo: 130.0,
        genres: &["alternative", "grunge", "punk-rock", "heavy-metal"],
    },
    BuiltinProfile {
        emotion: Emotion::Approval,
        valence: 0.725,
        energy: 0.575,
        danceability: 0.625,
        acousticness: 0.35,
        instrumentalness: 0.05,
        tempo: 112.0,
        genres: &["pop", "indie", "folk", "acoustic"],
    },
    BuiltinProfile {
        emotion: Emotion::Caring,
        valence: 0.65,
        energy: 0.425,
        danceability: 0.475,
        acousticness: 0.60,
        instrumentalness: 0.10,
        tempo: 92.0,
        genres: &["folk", "acoustic", "singer-songwriter", "indie"],
    },
    BuiltinProfile {
        emotion: Emotion::Confusion,
        valence: 0.40,
        energy: 0.475,
        danceability: 0.425,
        acousticness: 0.30,
        instrumentalness: 0.40,
        tempo: 105.0,
        genres: &["experimental", "ambient", "electronic", "indie"],
    },
    BuiltinProfile {
        emotion: Emotion::Curiosity,
        valence: 0.60,
        energy: 0.525,
        danceability: 0.575,
        acousticness: 0.35,
        instrumentalness: 0.35,
        tempo: 110.0,
        genres: &["indie", "experimental", "electronic", "world-music"],
    },
    BuiltinProfile {
        emotion: Emotion::Desire,
        valence: 0.725,
        energy: 0.625,
        danceability: 0.675,
        acousticness: 0.25,
        instrumentalness: 0.05,
        tempo: 105.0,
        genres: &["r-n-b", "soul", "funk", "dance"],
    },
    BuiltinProfile {
        emotion: Emotion::Disappointment,
        valence: 0.25,
        energy: 0.325,
        danceability: 0.375,
        acousticness: 0.60,
        instrumentalness: 0.15,
        tempo: 82.0,
        genres: &["blues", "sad", "acoustic", "indie"],
    },
    BuiltinProfile {
        emotion: Emotion::Disapproval,
        valence: 0.20,
        energy: 0.525,
        danceability: 0.375,
        acousticness: 0.15,
        instrumentalness: 0.10,
        tempo: 120.0,
        genres: &["alternative", "punk", "grunge", "indie-rock"],
    },
    BuiltinProfile {
        emotion: Emotion::Disgust,
        valence: 0.15,
        energy: 0.725,
        danceability: 0.325,
        acousticness: 0.10,
        instrumentalness: 0.20,
        tempo: 140.0,
        genres: &["metal", "industrial", "punk", "hardcore"],
    },
    BuiltinProfile {
        emotion: Emotion::Embarrassment,
        valence: 0.30,
        energy: 0.375,
        danceability: 0.325,
        acousticness: 0.50,
        instrumentalness: 0.10,
        tempo: 90.0,
        genres: &["indie", "acoustic", "folk", "chill"],
    },
    BuiltinProfile {
        emotion: Emotion::Excitement,
        valence: 0.85,
        energy: 0.825,
        danceability: 0.825,
        acousticness: 0.10,
        instrumentalness: 0.05,
        tempo: 128.0,
        genres: &["pop", "dance", "electronic", "upbeat"],
    },
    BuiltinProfile {
        emotion: Emotion::Fear,
        valence: 0.20,
        energy: 0.55,
        danceability: 0.275,
        acousticness: 0.25,
        instrumentalness: 0.45,
        tempo: 115.0,
        genres: &["dark-ambient", "industrial", "metal", "experimental"],
    },
    BuiltinProfile {
        emotion: Emotion::Gratitude,
        valence: 0.80,
        energy: 0.525,
        danceability: 0.575,
        acousticness: 0.55,
        instrumentalness: 0.05,
        tempo: 100.0,
        genres: &["gospel", "soul", "folk", "acoustic"],
    },
    BuiltinProfile {
        emotion: Emotion::Grief,
        valence: 0.15,
        energy: 0.275,
        danceability: 0.225,
        acousticness: 0.70,
        instrumentalness: 0.30,
        tempo: 70.0,
        genres: &["sad", "blues", "classical", "ambient"],
    },
    BuiltinProfile {
        emotion: Emotion::Joy,
        valence: 0.875,
        energy: 0.725,
        danceability: 0.80,
        acousticness: 0.20,
        instrumentalness: 0.03,
        tempo: 124.0,
        genres: &["pop", "dance", "funk", "happy"],
    },
    BuiltinProfile {
        emotion: Emotion::Love,
        valence: 0.825,
        energy: 0.575,
        danceability: 0.625,
        acousticness: 0.45,
        instrumentalness: 0.03,
        tempo: 96.0,
        genres: &["r-n-b", "soul", "romantic", "pop"],
    },
    BuiltinProfile {
        emotion: Emotion::Nervousness,
        valence: 0.35,
        energy: 0.625,
        danceability: 0.425,
        acousticness: 0.25,
        instrumentalness: 0.30,
        tempo: 122.0,
        genres: &["indie", "alternative", "electronic", "experimental"],
    },
    BuiltinProfile {
        emotion: Emotion::Optimism,
        valence: 0.80,
        energy: 0.675,
        danceability: 0.725,
        acousticness: 0.25,
        instrumentalness: 0.05,
        tempo: 120.0,
        genres: &["pop", "indie-pop", "upbeat", "happy"],
    },
    BuiltinProfile {
        emotion: Emotion::Pride,
        valence: 0.75,
        energy: 0.625,
        danceability: 0.675,
        acousticness: 0.20,
        instrumentalness: 0.05,
        tempo: 118.0,
        genres: &["pop", "rock", "anthemic", "uplifting"],
    },
    BuiltinProfile {
        emotion: Emotion::Realization,
        valence: 0.55,
        energy: 0.475,
        danceability: 0.525,
        acousticness: 0.50,
        instrumentalness: 0.25,
        tempo: 98.0,
        genres: &["indie", "folk", "acoustic", "contemplative"],
    },
    BuiltinProfile {
        emotion: Emotion::Relief,
        valence: 0.65,
        energy: 0.425,
        danceability: 0.475,
        acousticness: 0.60,
        instrumentalness: 0.25,
        tempo: 88.0,
        genres: &["chill", "ambient", "folk", "acoustic"],
    },
    BuiltinProfile {
        emotion: Emotion::Remorse,
        valence: 0.20,
        energy: 0.325,
        danceability: 0.275,
        acousticness: 0.65,
        instrumentalness: 0.20,
        tempo: 76.0,
        genres: &["sad", "blues", "folk", "acoustic"],
    },
    BuiltinProfile {
        emotion: Emotion::Sadness,
        valence: 0.15,
        energy: 0.275,
        danceability: 0.225,
        acousticness: 0.70,
        instrumentalness: 0.20,
        tempo: 72.0,
        genres: &["sad", "blues", "indie", "acoustic"],
    },
    BuiltinProfile {
        emotion: Emotion::Surprise,
        valence: 0.60,
        energy: 0.675,
        danceability: 0.625,
        acousticness: 0.20,
        instrumentalness: 0.25,
        tempo: 120.0,
        genres: &["experimental", "electronic", "indie", "alternative"],
    },
    BuiltinProfile {
        emotion: Emotion::Neutral,
        valence: 0.50,
        energy: 0.50,
        danceability: 0.55,
        acousticness: 0.40,
        instrumentalness: 0.20,
        tempo: 105.0,
        genres: &["indie", "study", "chill", "soft-rock"],
    },
];

impl BuiltinProfile {
    fn to_profile(&self) -> EmotionProfile {
        let baseline = [
            (AudioFeature::Valence, self.valence),
            (AudioFeature::Energy, self.energy),
            (AudioFeature::Danceability, self.danceability),
            (AudioFeature::Acousticness, self.acousticness),
            (AudioFeature::Instrumentalness, self.instrumentalness),
            (AudioFeature::Tempo, self.tempo),
        ]
        .into_iter()
        .collect();

        EmotionProfile {
            emotion: self.emotion,
            baseline,
            genres: self.genres.iter().map(|g| g.to_string()).collect(),
            artists: Vec::new(),
            tracks: Vec::new(),
        }
    }
}

/// Baseline feature vector and seed candidates for one emotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    pub emotion: Emotion,
    /// Baseline feature values; a feature may be left undefined
    pub baseline: BTreeMap<AudioFeature, f32>,
    /// Candidate seed genres, most representative first
    pub genres: Vec<String>,
    /// Candidate seed artist identifiers
    #[serde(default)]
    pub artists: Vec<String>,
    /// Candidate seed track identifiers
    #[serde(default)]
    pub tracks: Vec<String>,
}

impl EmotionProfile {
    pub fn baseline(&self, feature: AudioFeature) -> Option<f32> {
        self.baseline.get(&feature).copied()
    }

    pub fn seed_count(&self) -> usize {
        self.genres.len() + self.artists.len() + self.tracks.len()
    }
}

/// Partial profile read from an override file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverride {
    /// Feature name -> value; a null value removes the feature from the baseline
    #[serde(default)]
    pub baseline: HashMap<String, Option<f32>>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub artists: Option<Vec<String>>,
    #[serde(default)]
    pub tracks: Option<Vec<String>>,
}

/// Immutable table with exactly one profile per taxonomy label
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: Vec<EmotionProfile>,
}

impl ProfileTable {
    /// The built-in table
    pub fn builtin() -> Self {
        Self {
            profiles: BUILTIN_PROFILES.iter().map(BuiltinProfile::to_profile).collect(),
        }
    }

    /// Build a table from arbitrary profiles, rejecting gaps and duplicates
    pub fn from_profiles(profiles: Vec<EmotionProfile>) -> Result<Self, ProfileError> {
        let mut slots: Vec<Option<EmotionProfile>> = vec![None; Emotion::COUNT];
        for profile in profiles {
            let slot = &mut slots[profile.emotion.index()];
            if slot.is_some() {
                return Err(ProfileError::Duplicate(profile.emotion));
            }
            *slot = Some(profile);
        }

        let profiles = slots
            .into_iter()
            .zip(Emotion::ALL)
            .map(|(slot, emotion)| slot.ok_or(ProfileError::Missing(emotion)))
            .collect::<Result<Vec<_>, _>>()?;

        let table = Self { profiles };
        table.validate()?;
        Ok(table)
    }

    /// Built-in table merged with the overrides stored at `path`.
    ///
    /// The file format is picked from the extension (`.toml` or `.json`); the
    /// top-level keys are emotion labels.
    pub fn load_with_overrides(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let overrides: HashMap<String, ProfileOverride> = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ProfileError::Load(e.to_string()))?;

        Self::builtin().with_overrides(overrides)
    }

    /// Merge overrides onto this table and validate the result
    pub fn with_overrides(
        mut self,
        overrides: HashMap<String, ProfileOverride>,
    ) -> Result<Self, ProfileError> {
        for (label, patch) in overrides {
            let emotion: Emotion = label
                .parse()
                .map_err(|_| ProfileError::UnknownLabel(label.clone()))?;
            let profile = &mut self.profiles[emotion.index()];

            for (name, value) in patch.baseline {
                let feature: AudioFeature =
                    name.parse().map_err(|_| ProfileError::UnknownFeature {
                        emotion,
                        feature: name.clone(),
                    })?;
                match value {
                    Some(v) => profile.baseline.insert(feature, v),
                    None => profile.baseline.remove(&feature),
                };
            }
            if let Some(genres) = patch.genres {
                profile.genres = genres;
            }
            if let Some(artists) = patch.artists {
                profile.artists = artists;
            }
            if let Some(tracks) = patch.tracks {
                profile.tracks = tracks;
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Check coverage, ranges and seed availability
    pub fn validate(&self) -> Result<(), ProfileError> {
        for emotion in Emotion::ALL {
            let profile = self
                .profiles
                .get(emotion.index())
                .filter(|p| p.emotion == emotion)
                .ok_or(ProfileError::Missing(emotion))?;

            for (feature, value) in &profile.baseline {
                if !feature.contains(*value) {
                    return Err(ProfileError::OutOfRange {
                        emotion,
                        feature: *feature,
                        value: *value,
                    });
                }
            }

            if profile.seed_count() == 0 {
                return Err(ProfileError::NoSeeds(emotion));
            }
        }
        Ok(())
    }

    pub fn get(&self, emotion: Emotion) -> &EmotionProfile {
        &self.profiles[emotion.index()]
    }

    /// Profiles in taxonomy order
    pub fn iter(&self) -> impl Iterator<Item = &EmotionProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = ProfileTable::builtin();
        table.validate().unwrap();
        assert_eq!(table.len(), Emotion::COUNT);
    }

    #[test]
    fn test_builtin_defines_every_feature() {
        for profile in ProfileTable::builtin().iter() {
            for feature in AudioFeature::ALL {
                assert!(
                    profile.baseline(feature).is_some(),
                    "{} has no {} baseline",
                    profile.emotion,
                    feature
                );
            }
        }
    }

    #[test]
    fn test_builtin_order_matches_taxonomy() {
        for (profile, emotion) in ProfileTable::builtin().iter().zip(Emotion::ALL) {
            assert_eq!(profile.emotion, emotion);
        }
    }

    #[test]
    fn test_joy_baseline() {
        let table = ProfileTable::builtin();
        let joy = table.get(Emotion::Joy);
        assert_eq!(joy.baseline(AudioFeature::Valence), Some(0.875));
        assert_eq!(joy.genres[0], "pop");
    }

    #[test]
    fn test_from_profiles_rejects_gap() {
        let mut profiles: Vec<_> = ProfileTable::builtin().iter().cloned().collect();
        profiles.retain(|p| p.emotion != Emotion::Grief);
        let err = ProfileTable::from_profiles(profiles).unwrap_err();
        assert!(matches!(err, ProfileError::Missing(Emotion::Grief)));
    }

    #[test]
    fn test_from_profiles_rejects_duplicate() {
        let mut profiles: Vec<_> = ProfileTable::builtin().iter().cloned().collect();
        profiles.push(profiles[0].clone());
        let err = ProfileTable::from_profiles(profiles).unwrap_err();
        assert!(matches!(err, ProfileError::Duplicate(Emotion::Admiration)));
    }

    #[test]
    fn test_override_merges_and_removes() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "joy".to_string(),
            ProfileOverride {
                baseline: HashMap::from([
                    ("tempo".to_string(), Some(130.0)),
                    ("instrumentalness".to_string(), None),
                ]),
                artists: Some(vec!["artist-1".to_string()]),
                ..Default::default()
            },
        );

        let table = ProfileTable::builtin().with_overrides(overrides).unwrap();
        let joy = table.get(Emotion::Joy);
        assert_eq!(joy.baseline(AudioFeature::Tempo), Some(130.0));
        assert_eq!(joy.baseline(AudioFeature::Instrumentalness), None);
        assert_eq!(joy.artists, vec!["artist-1".to_string()]);
        // Untouched fields keep their built-in values
        assert_eq!(joy.genres.len(), 4);
    }

    #[test]
    fn test_override_out_of_range_rejected() {
        let overrides = HashMap::from([(
            "sadness".to_string(),
            ProfileOverride {
                baseline: HashMap::from([("valence".to_string(), Some(1.5))]),
                ..Default::default()
            },
        )]);

        let err = ProfileTable::builtin().with_overrides(overrides).unwrap_err();
        assert!(matches!(err, ProfileError::OutOfRange { .. }));
    }

    #[test]
    fn test_override_unknown_label_rejected() {
        let overrides = HashMap::from([("bliss".to_string(), ProfileOverride::default())]);
        let err = ProfileTable::builtin().with_overrides(overrides).unwrap_err();
        assert!(matches!(err, ProfileError::UnknownLabel(_)));
    }

    #[test]
    fn test_override_clearing_all_seeds_rejected() {
        let overrides = HashMap::from([(
            "neutral".to_string(),
            ProfileOverride {
                genres: Some(Vec::new()),
                ..Default::default()
            },
        )]);
        let err = ProfileTable::builtin().with_overrides(overrides).unwrap_err();
        assert!(matches!(err, ProfileError::NoSeeds(Emotion::Neutral)));
    }

    #[test]
    fn test_load_overrides_from_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("profiles.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[joy]\ngenres = [\"k-pop\", \"dance\"]\n\n[joy.baseline]\ntempo = 132.0\n"
        )
        .unwrap();

        let table = ProfileTable::load_with_overrides(&path).unwrap();
        let joy = table.get(Emotion::Joy);
        assert_eq!(joy.genres, vec!["k-pop".to_string(), "dance".to_string()]);
        assert_eq!(joy.baseline(AudioFeature::Tempo), Some(132.0));
    }
}
