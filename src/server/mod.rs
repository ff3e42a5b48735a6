//! HTTP server setup and routing.

mod analyze;
mod diaries;
mod extractors;
mod recommend;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogProvider;
use crate::classifier::EmotionClassifier;
use crate::config::AppConfig;
use crate::diary::DiaryStore;
use crate::emotion::ProfileTable;
use crate::error::AppError;
use crate::recommend::{EngineSettings, RecommendationEngine};

pub use extractors::MsgPackExtractor;
pub use routes::MsgPack;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Validated emotion profile table
    pub profiles: Arc<ProfileTable>,
    /// Catalog provider (recommendations are unavailable without one)
    pub catalog: Option<Arc<dyn CatalogProvider>>,
    /// Remote text classifier
    pub classifier: Option<Arc<dyn EmotionClassifier>>,
    /// Diary persistence
    pub diaries: Option<Arc<dyn DiaryStore>>,
    /// Server start time for uptime calculation
    pub started_at: Instant,
}

impl AppState {
    /// State with the built-in profile table and no collaborators
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            profiles: Arc::new(ProfileTable::builtin()),
            catalog: None,
            classifier: None,
            diaries: None,
            started_at: Instant::now(),
        }
    }

    /// Replace the profile table
    pub fn with_profiles(mut self, profiles: ProfileTable) -> Self {
        self.profiles = Arc::new(profiles);
        self
    }

    /// Set the catalog provider
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the emotion classifier
    pub fn with_classifier(mut self, classifier: Arc<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the diary store
    pub fn with_diary_store(mut self, store: Arc<dyn DiaryStore>) -> Self {
        self.diaries = Some(store);
        self
    }

    /// Recommendation engine over the configured catalog
    pub fn engine(&self) -> Result<RecommendationEngine, AppError> {
        let catalog = self.catalog.clone().ok_or_else(|| {
            AppError::CatalogUnavailable("no catalog provider configured".to_string())
        })?;

        Ok(RecommendationEngine::new(
            self.profiles.clone(),
            catalog,
            EngineSettings::from(&self.config.recommend),
        ))
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Creates the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/config", get(routes::config))
        // Taxonomy and recommendations
        .route("/emotions", get(recommend::list_emotions))
        .route("/recommend", post(recommend::recommend))
        .route("/genres", get(recommend::list_genres))
        // Text classification
        .route("/analyze", post(analyze::analyze))
        // Diary endpoints
        .route(
            "/users/:user_id/diaries",
            get(diaries::list_entries).post(diaries::upsert_entry),
        )
        .route(
            "/users/:user_id/diaries/:date",
            get(diaries::get_entry).delete(diaries::delete_entry),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
