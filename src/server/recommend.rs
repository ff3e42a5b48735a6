//! Taxonomy and recommendation endpoints.

use axum::extract::State;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::types::{EmotionInfo, EmotionsResponse, GenresResponse, RecommendRequest, RecommendResponse};

use super::extractors::MsgPackExtractor;
use super::routes::MsgPack;
use super::AppState;

/// List the emotion taxonomy with baseline profiles
///
/// GET /api/v1/emotions
pub async fn list_emotions(State(state): State<AppState>) -> MsgPack<EmotionsResponse> {
    MsgPack(EmotionsResponse {
        emotions: state.profiles.iter().map(EmotionInfo::from).collect(),
    })
}

/// Recommend tracks for a set of emotions
///
/// POST /api/v1/recommend
pub async fn recommend(
    State(state): State<AppState>,
    MsgPackExtractor(req): MsgPackExtractor<RecommendRequest>,
) -> Result<MsgPack<RecommendResponse>, AppError> {
    let engine = state.engine()?;
    let limit = engine.resolve_limit(req.limit)?;

    let result = engine.recommend(&req.selected, Some(limit)).await.map_err(|e| {
        warn!(error = %e, emotions = req.selected.len(), "Recommendation failed");
        AppError::from(e)
    })?;

    let partial = result.is_partial(limit);
    debug!(seeds = ?result.seeds.iter().collect::<Vec<_>>(), "Seeds selected");
    info!(
        emotions = req.selected.len(),
        limit,
        total = result.total,
        seeds = result.seeds.len(),
        partial,
        "Recommendation served"
    );

    let provider = state
        .catalog
        .as_ref()
        .map(|c| c.name().to_string())
        .unwrap_or_default();

    Ok(MsgPack(RecommendResponse {
        result,
        limit,
        partial,
        provider,
    }))
}

/// Genre seeds the catalog understands
///
/// GET /api/v1/genres
pub async fn list_genres(State(state): State<AppState>) -> Result<MsgPack<GenresResponse>, AppError> {
    let catalog = state.catalog.as_ref().ok_or_else(|| {
        AppError::CatalogUnavailable("no catalog provider configured".to_string())
    })?;

    let genres = catalog.genres().await?;

    Ok(MsgPack(GenresResponse {
        provider: catalog.name().to_string(),
        genres,
    }))
}
