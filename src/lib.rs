//! Emotune
//!
//! Emotion-aware music recommendation. Maps labeled emotion probabilities to
//! a target in audio-feature space, selects discovery seeds per emotion and
//! resolves both against a music catalog, exposed over a small MessagePack
//! HTTP API alongside diary storage and a text classifier client.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod diary;
pub mod emotion;
pub mod error;
pub mod features;
pub mod math;
pub mod recommend;
pub mod server;
pub mod types;

pub use crate::config::AppConfig;
pub use catalog::{CatalogProvider, Track};
pub use emotion::{Emotion, EmotionScore, ProfileTable};
pub use error::{AppError, Result};
pub use features::{AudioFeature, FeatureTarget};
pub use recommend::{RecommendError, RecommendationEngine, RecommendationResult};
