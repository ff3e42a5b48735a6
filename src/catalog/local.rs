//! Offline catalog backed by a JSON file of feature-annotated tracks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use super::{CatalogError, CatalogHit, CatalogProvider, CatalogQuery, SeedSet, Tolerance, Track};
use crate::features::{AudioFeature, FeatureTarget};
use crate::math::{unit_scale, weighted_distance};

/// Width of a relevance bucket in normalized distance units.
/// Tracks in the same bucket are ordered by popularity.
const RANK_BUCKET_WIDTH: f32 = 0.05;

/// A catalog track annotated with its audio features and genres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTrack {
    #[serde(flatten)]
    pub track: Track,
    #[serde(default)]
    pub features: BTreeMap<AudioFeature, f32>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl LocalTrack {
    fn matches_seeds(&self, seeds: &SeedSet) -> bool {
        if seeds.is_empty() {
            return true;
        }

        seeds
            .genres
            .iter()
            .any(|g| self.genres.iter().any(|own| own.eq_ignore_ascii_case(g)))
            || seeds
                .artists
                .iter()
                .any(|a| self.track.artists.iter().any(|own| own.eq_ignore_ascii_case(a)))
            || seeds.tracks.iter().any(|t| *t == self.track.id)
    }

    /// Whether every annotated feature lies within `tolerance` of the target
    fn within_tolerance(&self, target: &FeatureTarget, tolerance: f32) -> bool {
        self.features.iter().all(|(feature, value)| {
            (value - target.get(*feature)).abs() <= tolerance * feature.span()
        })
    }

    /// Distance to the target with every feature scaled onto [0, 1].
    /// Features the track does not annotate contribute nothing.
    fn distance(&self, target: &FeatureTarget) -> f32 {
        let (own, wanted): (Vec<f32>, Vec<f32>) = AudioFeature::ALL
            .iter()
            .map(|feature| {
                let (min, max) = feature.range();
                let goal = target.get(*feature);
                let value = self.features.get(feature).copied().unwrap_or(goal);
                (unit_scale(value, min, max), unit_scale(goal, min, max))
            })
            .unzip();

        let weights = vec![1.0 / AudioFeature::ALL.len() as f32; AudioFeature::ALL.len()];
        weighted_distance(&own, &wanted, &weights)
    }
}

/// Catalog provider that searches an in-memory track list
pub struct LocalCatalog {
    tracks: Vec<LocalTrack>,
    tolerance: f32,
}

impl LocalCatalog {
    pub fn new(tracks: Vec<LocalTrack>, tolerance: f32) -> Self {
        Self { tracks, tolerance }
    }

    /// Load tracks from a JSON array on disk
    pub fn from_path(path: impl AsRef<Path>, tolerance: f32) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Transport(format!("failed to read {}: {e}", path.display()))
        })?;
        let tracks: Vec<LocalTrack> = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Malformed(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), tracks = tracks.len(), "Loaded local catalog");
        Ok(Self::new(tracks, tolerance))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[async_trait]
impl CatalogProvider for LocalCatalog {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogHit>, CatalogError> {
        let mut scored: Vec<(u32, f32, &LocalTrack)> = self
            .tracks
            .iter()
            .filter(|t| t.matches_seeds(&query.seeds))
            .filter(|t| {
                query.tolerance == Tolerance::Broadened
                    || t.within_tolerance(&query.target, self.tolerance)
            })
            .map(|t| {
                let distance = t.distance(&query.target);
                let bucket = (distance / RANK_BUCKET_WIDTH).floor() as u32;
                (bucket, distance, t)
            })
            .collect();

        // Truncate only after popularity has ordered each bucket
        scored.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.2.track.popularity.cmp(&a.2.track.popularity))
                .then_with(|| a.1.total_cmp(&b.1))
        });
        scored.truncate(query.limit);

        debug!(
            matched = scored.len(),
            tolerance = ?query.tolerance,
            "Local catalog search"
        );

        Ok(scored
            .into_iter()
            .map(|(bucket, _, t)| CatalogHit::new(bucket, t.track.clone()))
            .collect())
    }

    /// Seeds match as alternatives here, so dropping a category would only
    /// shrink the candidate set. The retry relaxes tolerance alone.
    fn broaden(&self, query: &CatalogQuery) -> CatalogQuery {
        CatalogQuery {
            tolerance: Tolerance::Broadened,
            ..query.clone()
        }
    }

    async fn genres(&self) -> Result<Vec<String>, CatalogError> {
        let genres: BTreeSet<&str> = self
            .tracks
            .iter()
            .flat_map(|t| t.genres.iter().map(String::as_str))
            .collect();
        Ok(genres.into_iter().map(str::to_string).collect())
    }
}
