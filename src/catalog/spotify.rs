//! Spotify Web API catalog provider.
//!
//! Uses the client-credentials flow; the access token is cached until shortly
//! before it expires. The token lock is never held across a network call.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CatalogError, CatalogHit, CatalogProvider, CatalogQuery, Tolerance, Track};
use crate::config::SpotifyConfig;
use crate::features::AudioFeature;

/// Refresh the token this long before Spotify says it expires
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

/// Spotify caps recommendation requests at 100 tracks
const SPOTIFY_MAX_LIMIT: usize = 100;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Catalog provider backed by the Spotify recommendations endpoint
pub struct SpotifyCatalog {
    client: Client,
    config: SpotifyConfig,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyCatalog {
    /// Create a provider; fails if credentials are missing
    pub fn new(config: SpotifyConfig) -> Result<Self, CatalogError> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(CatalogError::Auth(
                "Spotify client_id and client_secret must be configured".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("emotune/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        info!(api_url = %config.api_url, "Spotify catalog initialized");

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.token.lock().unwrap_or_else(|poisoned| {
            warn!("Token cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn cached_token(&self) -> Option<String> {
        self.token_slot()
            .as_ref()
            .filter(|t| Instant::now() < t.expires_at)
            .map(|t| t.value.clone())
    }

    fn invalidate_token(&self) {
        *self.token_slot() = None;
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        debug!("Requesting Spotify access token");
        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Auth(format!(
                "token endpoint returned {status}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;

        let lifetime = payload
            .expires_in
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        *self.token_slot() = Some(CachedToken {
            value: payload.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(payload.access_token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, CatalogError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| CatalogError::Malformed(e.to_string())),
            StatusCode::UNAUTHORIZED => {
                self.invalidate_token();
                Err(CatalogError::Auth("access token rejected".to_string()))
            }
            status => Err(CatalogError::Transport(format!(
                "{url} returned {status}"
            ))),
        }
    }
}

fn transport_error(e: reqwest::Error) -> CatalogError {
    CatalogError::Transport(e.to_string())
}

/// Build the recommendations query string for a catalog query
fn recommendation_params(query: &CatalogQuery, tolerance: f32) -> Vec<(String, String)> {
    let mut params = vec![(
        "limit".to_string(),
        query.limit.min(SPOTIFY_MAX_LIMIT).to_string(),
    )];

    for (key, values) in [
        ("seed_genres", &query.seeds.genres),
        ("seed_artists", &query.seeds.artists),
        ("seed_tracks", &query.seeds.tracks),
    ] {
        if !values.is_empty() {
            params.push((key.to_string(), values.join(",")));
        }
    }

    for (feature, value) in query.target.iter() {
        params.push((format!("target_{feature}"), format_value(feature, value)));

        if query.tolerance == Tolerance::Strict {
            let window = tolerance * feature.span();
            params.push((
                format!("min_{feature}"),
                format_value(feature, feature.clamp_value(value - window)),
            ));
            params.push((
                format!("max_{feature}"),
                format_value(feature, feature.clamp_value(value + window)),
            ));
        }
    }

    params
}

fn format_value(feature: AudioFeature, value: f32) -> String {
    match feature {
        AudioFeature::Tempo => format!("{value:.1}"),
        _ => format!("{value:.3}"),
    }
}

#[async_trait]
impl CatalogProvider for SpotifyCatalog {
    fn name(&self) -> &'static str {
        "spotify"
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogHit>, CatalogError> {
        let url = format!("{}/recommendations", self.config.api_url);
        let params = recommendation_params(query, self.config.tolerance);

        let payload: RecommendationsResponse = self.get_json(&url, &params).await?;

        debug!(
            returned = payload.tracks.len(),
            tolerance = ?query.tolerance,
            "Spotify recommendations received"
        );

        Ok(payload
            .tracks
            .into_iter()
            .enumerate()
            .map(|(position, track)| CatalogHit::new(position as u32, track.into()))
            .collect())
    }

    async fn genres(&self) -> Result<Vec<String>, CatalogError> {
        let url = format!(
            "{}/recommendations/available-genre-seeds",
            self.config.api_url
        );
        let payload: GenreSeedsResponse = self.get_json(&url, &[]).await?;
        Ok(payload.genres)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct GenreSeedsResponse {
    genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: SpotifyAlbum,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    external_urls: HashMap<String, String>,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    popularity: u8,
    #[serde(default)]
    explicit: bool,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    name: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

impl From<SpotifyTrack> for Track {
    fn from(track: SpotifyTrack) -> Self {
        Track {
            external_url: track
                .external_urls
                .get("spotify")
                .cloned()
                .unwrap_or_else(|| format!("https://open.spotify.com/track/{}", track.id)),
            id: track.id,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            image_url: track.album.images.into_iter().next().map(|i| i.url),
            album: track.album.name,
            preview_url: track.preview_url,
            duration_ms: track.duration_ms,
            popularity: track.popularity.min(100),
            explicit: track.explicit,
        }
    }
}
