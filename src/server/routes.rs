//! HTTP route handlers for service status.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::config::CatalogKind;
use crate::types::{
    CatalogInfo, ClassifierInfo, ConfigResponse, DiaryInfo, HealthResponse, HealthStatus,
    RecommendInfo, ServerInfo,
};

use super::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `MessagePack` response wrapper
pub struct MsgPack<T>(pub T);

impl<T: serde::Serialize> IntoResponse for MsgPack<T> {
    fn into_response(self) -> Response {
        match rmp_serde::to_vec_named(&self.0) {
            Ok(bytes) => (
                StatusCode::OK,
                [("content-type", "application/msgpack")],
                bytes,
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize response: {e}"),
            )
                .into_response(),
        }
    }
}

/// Health check endpoint
///
/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> MsgPack<HealthResponse> {
    let catalog = state.catalog.as_ref().map(|c| c.name().to_string());

    // Degraded if a catalog was configured but could not be initialized
    let status = if catalog.is_none() && state.config.catalog.provider != CatalogKind::None {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    MsgPack(HealthResponse {
        status,
        version: VERSION.to_string(),
        catalog,
        classifier_ready: state.classifier.is_some(),
        diary_ready: state.diaries.is_some(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Configuration endpoint
///
/// GET /api/v1/config
pub async fn config(State(state): State<AppState>) -> MsgPack<ConfigResponse> {
    let config = &state.config;

    let provider = match config.catalog.provider {
        CatalogKind::Spotify => "spotify",
        CatalogKind::Local => "local",
        CatalogKind::None => "none",
    };

    MsgPack(ConfigResponse {
        server: ServerInfo {
            host: config.server.host.clone(),
            port: config.server.port,
        },
        recommend: RecommendInfo {
            default_limit: config.recommend.default_limit,
            max_limit: config.recommend.max_limit,
            max_emotions: config.recommend.max_emotions,
            seed_cap: config.recommend.seed_cap,
            timeout_ms: config.recommend.timeout_ms,
            profile_overrides: config.profiles.path.is_some(),
        },
        catalog: CatalogInfo {
            provider: provider.to_string(),
            connected: state.catalog.is_some(),
        },
        classifier: ClassifierInfo {
            configured: state.classifier.is_some(),
            threshold: config.classifier.threshold,
            topk: config.classifier.topk,
        },
        diary: DiaryInfo {
            enabled: config.diary.enabled,
            connected: state.diaries.is_some(),
        },
    })
}
