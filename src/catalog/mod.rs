//! Catalog provider abstraction.
//!
//! A catalog provider resolves a feature target plus discovery seeds into
//! concrete tracks. This module provides:
//! - the [`CatalogProvider`] trait the recommendation engine depends on
//! - a Spotify Web API implementation
//! - a local JSON catalog for offline use

mod local;
mod spotify;

pub use local::{LocalCatalog, LocalTrack};
pub use spotify::SpotifyCatalog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::features::FeatureTarget;

/// Error type for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Catalog transport error: {0}")]
    Transport(String),

    #[error("Catalog authentication failed: {0}")]
    Auth(String),

    #[error("Malformed catalog response: {0}")]
    Malformed(String),

    #[error("Catalog operation not supported: {0}")]
    Unsupported(String),
}

/// A track as returned by a catalog provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub external_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    /// Popularity in [0, 100]
    #[serde(default)]
    pub popularity: u8,
    #[serde(default)]
    pub explicit: bool,
}

/// A track together with the provider's relevance rank (lower is better).
///
/// Providers without discrete relevance buckets use the result position.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHit {
    pub rank: u32,
    pub track: Track,
}

impl CatalogHit {
    pub fn new(rank: u32, track: Track) -> Self {
        Self { rank, track }
    }
}

/// Seed category, in selection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedCategory {
    Genre,
    Artist,
    Track,
}

/// Discovery seeds grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSet {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<String>,
}

impl SeedSet {
    pub fn push(&mut self, category: SeedCategory, id: impl Into<String>) {
        self.category_mut(category).push(id.into());
    }

    pub fn category(&self, category: SeedCategory) -> &[String] {
        match category {
            SeedCategory::Genre => &self.genres,
            SeedCategory::Artist => &self.artists,
            SeedCategory::Track => &self.tracks,
        }
    }

    fn category_mut(&mut self, category: SeedCategory) -> &mut Vec<String> {
        match category {
            SeedCategory::Genre => &mut self.genres,
            SeedCategory::Artist => &mut self.artists,
            SeedCategory::Track => &mut self.tracks,
        }
    }

    /// Total number of seeds across categories
    pub fn len(&self) -> usize {
        self.genres.len() + self.artists.len() + self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All seeds in category order (genres, artists, tracks)
    pub fn iter(&self) -> impl Iterator<Item = (SeedCategory, &str)> {
        self.genres
            .iter()
            .map(|s| (SeedCategory::Genre, s.as_str()))
            .chain(self.artists.iter().map(|s| (SeedCategory::Artist, s.as_str())))
            .chain(self.tracks.iter().map(|s| (SeedCategory::Track, s.as_str())))
    }

    /// Seeds with the lowest-priority populated category removed.
    ///
    /// Tracks go before artists; genres are never dropped, and a set with a
    /// single populated category is returned unchanged.
    pub fn without_lowest_category(&self) -> SeedSet {
        let populated = [SeedCategory::Genre, SeedCategory::Artist, SeedCategory::Track]
            .into_iter()
            .filter(|c| !self.category(*c).is_empty())
            .count();

        let mut broadened = self.clone();
        if populated > 1 {
            if !broadened.tracks.is_empty() {
                broadened.tracks.clear();
            } else {
                broadened.artists.clear();
            }
        }
        broadened
    }
}

/// How tightly the provider should hold results to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    /// Target values plus bounded min/max windows
    Strict,
    /// Target values only
    Broadened,
}

/// A single request to a catalog provider
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub target: FeatureTarget,
    pub seeds: SeedSet,
    pub limit: usize,
    pub tolerance: Tolerance,
}

impl CatalogQuery {
    pub fn new(target: FeatureTarget, seeds: SeedSet, limit: usize) -> Self {
        Self {
            target,
            seeds,
            limit,
            tolerance: Tolerance::Strict,
        }
    }

    /// The relaxed variant used for the single broadening retry
    pub fn broadened(&self) -> Self {
        Self {
            target: self.target.clone(),
            seeds: self.seeds.without_lowest_category(),
            limit: self.limit,
            tolerance: Tolerance::Broadened,
        }
    }
}

/// External music catalog capable of target-driven discovery
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Short provider identifier, used in logs and API responses
    fn name(&self) -> &'static str;

    /// Resolve a query into tracks in relevance order
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogHit>, CatalogError>;

    /// Whether a relaxed retry can yield different results
    fn supports_broadening(&self) -> bool {
        true
    }

    /// The relaxed query for the single retry.
    ///
    /// Defaults to [`CatalogQuery::broadened`], which also drops the
    /// lowest-priority seed category. Providers that treat seeds as
    /// alternatives rather than constraints should only relax tolerance.
    fn broaden(&self, query: &CatalogQuery) -> CatalogQuery {
        query.broadened()
    }

    /// Genre seeds this provider understands
    async fn genres(&self) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Unsupported(format!(
            "{} does not list genres",
            self.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(genres: &[&str], artists: &[&str], tracks: &[&str]) -> SeedSet {
        SeedSet {
            genres: genres.iter().map(|s| s.to_string()).collect(),
            artists: artists.iter().map(|s| s.to_string()).collect(),
            tracks: tracks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_seed_iter_category_order() {
        let set = seeds(&["pop"], &["a1"], &["t1"]);
        let order: Vec<_> = set.iter().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![SeedCategory::Genre, SeedCategory::Artist, SeedCategory::Track]
        );
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_without_lowest_category_drops_tracks_first() {
        let set = seeds(&["pop"], &["a1"], &["t1"]);
        assert_eq!(set.without_lowest_category(), seeds(&["pop"], &["a1"], &[]));
    }

    #[test]
    fn test_without_lowest_category_drops_artists_next() {
        let set = seeds(&["pop"], &["a1"], &[]);
        assert_eq!(set.without_lowest_category(), seeds(&["pop"], &[], &[]));
    }

    #[test]
    fn test_without_lowest_category_keeps_single_category() {
        let genres_only = seeds(&["pop", "funk"], &[], &[]);
        assert_eq!(genres_only.without_lowest_category(), genres_only);

        let artists_only = seeds(&[], &["a1"], &[]);
        assert_eq!(artists_only.without_lowest_category(), artists_only);
    }

    #[test]
    fn test_broadened_query() {
        let target = FeatureTarget::from_fn(|f| f.midpoint());
        let query = CatalogQuery::new(target, seeds(&["pop"], &[], &["t1"]), 4);
        let broadened = query.broadened();
        assert_eq!(broadened.tolerance, Tolerance::Broadened);
        assert!(broadened.seeds.tracks.is_empty());
        assert_eq!(broadened.limit, 4);
    }
}
