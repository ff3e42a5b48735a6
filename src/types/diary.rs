//! API request and response types for diary entries.

use serde::{Deserialize, Serialize};

use crate::diary::DiaryEntry;
use crate::recommend::RecommendationResult;

/// Create or update the entry for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryUpsertRequest {
    /// `YYYY-MM-DD`; today when omitted or unparsable
    #[serde(default)]
    pub date: Option<String>,
    pub content: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub music: Option<RecommendationResult>,
}

/// Query parameters for listing entries
#[derive(Debug, Clone, Deserialize)]
pub struct DiaryListQuery {
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryListResponse {
    pub user_id: u64,
    pub entries: Vec<DiaryEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryDeleteResponse {
    pub user_id: u64,
    pub date: String,
    pub deleted: bool,
}
