//! Emotion classifier collaborator.
//!
//! The classifier model itself runs elsewhere; this module only defines the
//! interface, the rule that turns 28 raw probabilities into ranked
//! predictions, and an HTTP client for a remote inference service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ClassifierConfig;
use crate::emotion::{Emotion, EmotionScore};

/// Error type for classifier operations
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Invalid classifier input: {0}")]
    InvalidInput(String),

    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed classifier response: {0}")]
    Malformed(String),
}

/// How raw probabilities become predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOptions {
    /// Minimum probability in threshold mode
    pub threshold: f32,
    /// Take the k most probable labels; 0 selects threshold mode
    pub topk: usize,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            threshold: 0.30,
            topk: 3,
        }
    }
}

/// Classifier output for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Selected labels, most probable first
    pub predictions: Vec<EmotionScore>,
    /// Raw probability per label in taxonomy order
    pub all_probabilities: Vec<f32>,
}

/// Select predictions from a full probability vector.
///
/// With `topk > 0` the k most probable labels are returned. Otherwise every
/// label at or above `threshold` is returned, falling back to the single most
/// probable label when none qualifies. Ties keep taxonomy order.
pub fn select_predictions(probabilities: &[f32], options: PredictionOptions) -> Vec<EmotionScore> {
    let mut ranked: Vec<(Emotion, f32)> = Emotion::ALL
        .iter()
        .copied()
        .zip(probabilities.iter().map(|p| p + 0.0))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let selected: Vec<(Emotion, f32)> = if options.topk > 0 {
        ranked.into_iter().take(options.topk).collect()
    } else {
        let above: Vec<_> = ranked
            .iter()
            .copied()
            .filter(|(_, p)| *p >= options.threshold)
            .collect();
        if above.is_empty() {
            ranked.into_iter().take(1).collect()
        } else {
            above
        }
    };

    selected.into_iter().map(EmotionScore::from).collect()
}

/// Text-to-emotion classifier
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw probabilities for every label, in taxonomy order
    async fn probabilities(&self, text: &str) -> Result<Vec<f32>, ClassifierError>;

    /// Classify `text` and select predictions
    async fn analyze(
        &self,
        text: &str,
        options: PredictionOptions,
    ) -> Result<Analysis, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }

        let all_probabilities = self.probabilities(text).await?;
        if all_probabilities.len() != Emotion::COUNT {
            return Err(ClassifierError::Malformed(format!(
                "expected {} probabilities, got {}",
                Emotion::COUNT,
                all_probabilities.len()
            )));
        }
        if let Some(bad) = all_probabilities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(ClassifierError::Malformed(format!(
                "probability out of range: {bad}"
            )));
        }

        Ok(Analysis {
            predictions: select_predictions(&all_probabilities, options),
            all_probabilities,
        })
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    probabilities: Vec<f32>,
}

/// Classifier backed by a remote HTTP inference service.
///
/// Expects `POST {url}` with `{"text": ...}` to answer
/// `{"probabilities": [f32; 28]}`.
pub struct HttpClassifier {
    client: Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let url = url.into();
        let client = Client::builder()
            .user_agent(concat!("emotune/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        info!(url = %url, "HTTP classifier initialized");
        Ok(Self { client, url })
    }

    /// Build from configuration; `None` when no URL is configured
    pub fn from_config(config: &ClassifierConfig) -> Result<Option<Self>, ClassifierError> {
        match &config.url {
            Some(url) if !url.is_empty() => {
                Self::new(url.clone(), Duration::from_millis(config.timeout_ms)).map(Some)
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl EmotionClassifier for HttpClassifier {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn probabilities(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "classifier returned {status}"
            )));
        }

        let payload: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        debug!(labels = payload.probabilities.len(), "Classifier responded");
        Ok(payload.probabilities)
    }
}
