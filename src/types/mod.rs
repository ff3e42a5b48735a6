//! Shared types for the emotune API.
//!
//! These types are used across the application for request/response handling.

pub mod api;
pub mod diary;

use serde::{Deserialize, Serialize};

pub use api::*;
pub use diary::*;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// Name of the configured catalog provider, if any
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub classifier_ready: bool,
    #[serde(default)]
    pub diary_ready: bool,
    #[serde(default)]
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Configuration response (subset of config safe to expose)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub server: ServerInfo,
    pub recommend: RecommendInfo,
    pub catalog: CatalogInfo,
    pub classifier: ClassifierInfo,
    pub diary: DiaryInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendInfo {
    pub default_limit: usize,
    pub max_limit: usize,
    pub max_emotions: usize,
    pub seed_cap: usize,
    pub timeout_ms: u64,
    /// Whether the profile table was loaded with overrides
    pub profile_overrides: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub provider: String,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierInfo {
    pub configured: bool,
    pub threshold: f32,
    pub topk: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryInfo {
    pub enabled: bool,
    pub connected: bool,
}
