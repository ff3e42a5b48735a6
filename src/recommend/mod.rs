//! Emotion-to-music recommendation engine.
//!
//! Turns a set of labeled emotion probabilities into:
//! 1. a target point in audio-feature space ([`aggregate_target`])
//! 2. a capped set of discovery seeds ([`select_seeds`])
//! 3. a deduplicated, ranked track list from a [`CatalogProvider`]
//!
//! The engine holds no mutable state and does not log; callers decide how to
//! report its outcome.

mod aggregate;
mod ranking;
mod seeds;
mod selection;

pub use aggregate::aggregate_target;
pub use ranking::{dedup_and_rank, merge_broadened};
pub use seeds::select_seeds;
pub use selection::{select_considered, ConsideredEmotion};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogError, CatalogHit, CatalogProvider, CatalogQuery, SeedSet, Track};
use crate::config::RecommendConfig;
use crate::emotion::{EmotionScore, ProfileTable};
use crate::features::FeatureTarget;

/// Error type for recommendation requests
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),
}

/// Outcome of a successful recommendation.
///
/// `total` always equals `tracks.len()`; a total below the requested limit
/// is a partial result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub target: FeatureTarget,
    pub seeds: SeedSet,
    pub tracks: Vec<Track>,
    pub total: usize,
}

impl RecommendationResult {
    pub fn is_partial(&self, limit: usize) -> bool {
        self.total < limit
    }
}

/// Tunables for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Track count when the caller does not specify one
    pub default_limit: usize,
    /// Requested limits above this are clamped
    pub max_limit: usize,
    /// How many of the most probable emotions are considered
    pub max_emotions: usize,
    /// Maximum number of seeds sent to the provider
    pub seed_cap: usize,
    /// Bound on each provider call
    pub timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_limit: 4,
            max_limit: 50,
            max_emotions: 3,
            seed_cap: 5,
            timeout: Duration::from_secs(5),
        }
    }
}

impl From<&RecommendConfig> for EngineSettings {
    fn from(config: &RecommendConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            max_emotions: config.max_emotions,
            seed_cap: config.seed_cap,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Recommendation engine bound to a profile table and a catalog provider
#[derive(Clone)]
pub struct RecommendationEngine {
    profiles: Arc<ProfileTable>,
    catalog: Arc<dyn CatalogProvider>,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(
        profiles: Arc<ProfileTable>,
        catalog: Arc<dyn CatalogProvider>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            profiles,
            catalog,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Feature target for a set of scores, without touching the catalog
    pub fn target_for(&self, scores: &[EmotionScore]) -> Result<FeatureTarget, RecommendError> {
        let considered = select_considered(scores, self.settings.max_emotions)?;
        Ok(aggregate_target(&self.profiles, &considered))
    }

    /// Seed set for a set of scores, without touching the catalog
    pub fn seeds_for(&self, scores: &[EmotionScore]) -> Result<SeedSet, RecommendError> {
        let considered = select_considered(scores, self.settings.max_emotions)?;
        Ok(select_seeds(&self.profiles, &considered, self.settings.seed_cap))
    }

    /// Effective track count: the default when absent, clamped to the maximum
    pub fn resolve_limit(&self, limit: Option<usize>) -> Result<usize, RecommendError> {
        match limit {
            Some(0) => Err(RecommendError::InvalidInput(
                "limit must be at least 1".to_string(),
            )),
            Some(n) => Ok(n.min(self.settings.max_limit)),
            None => Ok(self.settings.default_limit.min(self.settings.max_limit)),
        }
    }

    /// Recommend tracks for the given emotion scores.
    ///
    /// All validation happens before the catalog is contacted. If the first
    /// query yields fewer than `limit` tracks, one broadened query is issued;
    /// its failure leaves the first-attempt tracks as the result.
    ///
    /// # Errors
    /// - `InvalidInput` for bad scores or a zero limit
    /// - `CatalogUnavailable` if the first query fails or times out
    pub async fn recommend(
        &self,
        scores: &[EmotionScore],
        limit: Option<usize>,
    ) -> Result<RecommendationResult, RecommendError> {
        let limit = self.resolve_limit(limit)?;
        let considered = select_considered(scores, self.settings.max_emotions)?;
        let target = aggregate_target(&self.profiles, &considered);
        let seeds = select_seeds(&self.profiles, &considered, self.settings.seed_cap);

        let query = CatalogQuery::new(target.clone(), seeds.clone(), limit);
        let hits = self.query_catalog(&query).await?;
        let mut tracks = dedup_and_rank(hits, limit);

        if tracks.len() < limit && self.catalog.supports_broadening() {
            if let Ok(retry) = self.query_catalog(&self.catalog.broaden(&query)).await {
                tracks = merge_broadened(tracks, retry, limit);
            }
        }

        Ok(RecommendationResult {
            target,
            seeds,
            total: tracks.len(),
            tracks,
        })
    }

    async fn query_catalog(&self, query: &CatalogQuery) -> Result<Vec<CatalogHit>, CatalogError> {
        let timeout = self.settings.timeout;
        match tokio::time::timeout(timeout, self.catalog.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Timeout(timeout)),
        }
    }
}
