//! Text classification endpoint.

use axum::extract::State;
use tracing::{debug, warn};

use crate::classifier::PredictionOptions;
use crate::error::AppError;
use crate::types::{AnalyzeRequest, AnalyzeResponse};

use super::extractors::MsgPackExtractor;
use super::routes::MsgPack;
use super::AppState;

/// Classify free text into emotion predictions
///
/// POST /api/v1/analyze
pub async fn analyze(
    State(state): State<AppState>,
    MsgPackExtractor(req): MsgPackExtractor<AnalyzeRequest>,
) -> Result<MsgPack<AnalyzeResponse>, AppError> {
    let classifier = state.classifier.as_ref().ok_or_else(|| {
        AppError::ClassifierUnavailable("no classifier configured".to_string())
    })?;

    let options = PredictionOptions {
        threshold: req.threshold.unwrap_or(state.config.classifier.threshold),
        topk: req.topk.unwrap_or(state.config.classifier.topk),
    };
    if !(0.0..=1.0).contains(&options.threshold) {
        return Err(AppError::InvalidInput(format!(
            "threshold must be within [0, 1], got {}",
            options.threshold
        )));
    }

    let analysis = classifier.analyze(&req.text, options).await.map_err(|e| {
        warn!(error = %e, classifier = classifier.name(), "Classification failed");
        AppError::from(e)
    })?;

    debug!(
        predictions = analysis.predictions.len(),
        topk = options.topk,
        "Text classified"
    );

    Ok(MsgPack(AnalyzeResponse {
        predictions: analysis.predictions,
        all_probabilities: analysis.all_probabilities,
    }))
}
