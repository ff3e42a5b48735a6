//! API request and response types for recommendation and analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::SeedSet;
use crate::emotion::{EmotionProfile, EmotionScore};
use crate::features::AudioFeature;
use crate::recommend::RecommendationResult;

/// Request for track recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Emotions picked by the user or returned by `/analyze`
    pub selected: Vec<EmotionScore>,
    /// Number of tracks wanted (server default when omitted)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Recommendation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(flatten)]
    pub result: RecommendationResult,
    /// Effective limit after defaulting and clamping
    pub limit: usize,
    /// True when fewer than `limit` tracks were found
    pub partial: bool,
    /// Catalog provider that answered
    pub provider: String,
}

/// Request to classify free text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Minimum probability in threshold mode (server default when omitted)
    #[serde(default)]
    pub threshold: Option<f32>,
    /// Number of predictions; 0 selects threshold mode (server default when omitted)
    #[serde(default)]
    pub topk: Option<usize>,
}

/// Classifier output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub predictions: Vec<EmotionScore>,
    pub all_probabilities: Vec<f32>,
}

/// One taxonomy entry with its profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionInfo {
    pub label: String,
    pub baseline: BTreeMap<AudioFeature, f32>,
    pub seeds: SeedSet,
}

impl From<&EmotionProfile> for EmotionInfo {
    fn from(profile: &EmotionProfile) -> Self {
        Self {
            label: profile.emotion.as_str().to_string(),
            baseline: profile.baseline.clone(),
            seeds: SeedSet {
                genres: profile.genres.clone(),
                artists: profile.artists.clone(),
                tracks: profile.tracks.clone(),
            },
        }
    }
}

/// Taxonomy listing, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionsResponse {
    pub emotions: Vec<EmotionInfo>,
}

/// Genre seeds supported by the catalog provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenresResponse {
    pub provider: String,
    pub genres: Vec<String>,
}
