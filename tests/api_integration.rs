//! Integration tests for API endpoints.
//!
//! These tests drive the router with in-memory collaborators so no network
//! catalog or classifier is needed.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tempfile::TempDir;

use emotune::catalog::{CatalogError, CatalogHit, CatalogProvider, CatalogQuery, Track};
use emotune::classifier::{ClassifierError, EmotionClassifier};
use emotune::config::AppConfig;
use emotune::diary::{DiaryEntry, RedbDiaryStore};
use emotune::emotion::Emotion;
use emotune::server::{create_router, AppState};
use emotune::types::{
    AnalyzeResponse, DiaryDeleteResponse, DiaryListResponse, EmotionsResponse, GenresResponse,
    HealthResponse, HealthStatus,
};
use emotune::RecommendationResult;

/// Catalog that serves a fixed track list regardless of the query
struct FixedCatalog {
    tracks: Vec<CatalogHit>,
}

#[async_trait]
impl CatalogProvider for FixedCatalog {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogHit>, CatalogError> {
        Ok(self.tracks.iter().take(query.limit).cloned().collect())
    }

    async fn genres(&self) -> Result<Vec<String>, CatalogError> {
        Ok(vec!["pop".to_string(), "sad".to_string()])
    }
}

/// Catalog whose every call fails
struct DownCatalog;

#[async_trait]
impl CatalogProvider for DownCatalog {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn search(&self, _query: &CatalogQuery) -> Result<Vec<CatalogHit>, CatalogError> {
        Err(CatalogError::Transport("connection refused".to_string()))
    }
}

/// Classifier that always favours joy
struct JoyfulClassifier;

#[async_trait]
impl EmotionClassifier for JoyfulClassifier {
    fn name(&self) -> &'static str {
        "joyful"
    }

    async fn probabilities(&self, _text: &str) -> Result<Vec<f32>, ClassifierError> {
        let mut probs = vec![0.01; Emotion::COUNT];
        probs[Emotion::Joy.index()] = 0.8;
        probs[Emotion::Excitement.index()] = 0.4;
        Ok(probs)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
}

#[derive(Debug, Deserialize)]
struct RecommendFlags {
    limit: usize,
    partial: bool,
    provider: String,
}

fn track(id: &str, popularity: u8) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {id}"),
        artists: vec!["Someone".to_string()],
        album: "Record".to_string(),
        preview_url: None,
        external_url: format!("https://example.test/{id}"),
        image_url: None,
        duration_ms: 180_000,
        popularity,
        explicit: false,
    }
}

fn fixed_catalog(ids: &[&str]) -> Arc<FixedCatalog> {
    Arc::new(FixedCatalog {
        tracks: ids
            .iter()
            .enumerate()
            .map(|(i, id)| CatalogHit::new(i as u32, track(id, 50)))
            .collect(),
    })
}

/// Create a test server with default configuration (no collaborators)
fn create_test_server() -> TestServer {
    let state = AppState::new(AppConfig::default());
    TestServer::new(create_router(state)).unwrap()
}

fn create_full_server(catalog: Arc<dyn CatalogProvider>) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = RedbDiaryStore::new(temp_dir.path().join("diary.redb")).unwrap();

    let state = AppState::new(AppConfig::default())
        .with_catalog(catalog)
        .with_classifier(Arc::new(JoyfulClassifier))
        .with_diary_store(Arc::new(store));

    (TestServer::new(create_router(state)).unwrap(), temp_dir)
}

/// Helper to create msgpack bytes
fn msgpack_bytes<T: serde::Serialize>(value: &T) -> Bytes {
    Bytes::from(rmp_serde::to_vec_named(value).unwrap())
}

fn decode<T: serde::de::DeserializeOwned>(response: &axum_test::TestResponse) -> T {
    rmp_serde::from_slice(response.as_bytes()).unwrap()
}

fn error_code(response: &axum_test::TestResponse) -> String {
    decode::<ErrorBody>(response).error.code
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/api/v1/health").await;

    response.assert_status_ok();
    let content_type = response.headers().get("content-type");
    assert!(content_type.is_some());
    assert!(content_type.unwrap().to_str().unwrap().contains("msgpack"));

    let health: HealthResponse = decode(&response);
    assert_eq!(health.status, HealthStatus::Healthy);
    assert!(health.catalog.is_none());
    assert!(!health.diary_ready);
}

#[tokio::test]
async fn test_config_endpoint() {
    let server = create_test_server();

    let response = server.get("/api/v1/config").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_emotions_endpoint_lists_taxonomy_in_order() {
    let server = create_test_server();

    let response = server.get("/api/v1/emotions").await;

    response.assert_status_ok();
    let body: EmotionsResponse = decode(&response);
    assert_eq!(body.emotions.len(), 28);
    assert_eq!(body.emotions[0].label, "admiration");
    assert_eq!(body.emotions[27].label, "neutral");
    assert!(!body.emotions[17].seeds.genres.is_empty());
}

#[tokio::test]
async fn test_recommend_without_catalog() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommend")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "selected": [{"label": "joy", "probability": 0.9}]
        })))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&response), "CATALOG_UNAVAILABLE");
}

#[tokio::test]
async fn test_recommend_success() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a", "b", "c", "d", "e"]));

    let response = server
        .post("/api/v1/recommend")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "selected": [
                {"label": "joy", "probability": 0.7},
                {"label": "love", "probability": 0.3}
            ]
        })))
        .await;

    response.assert_status_ok();
    let result: RecommendationResult = decode(&response);
    let flags: RecommendFlags = decode(&response);

    assert_eq!(result.total, 4);
    assert_eq!(result.tracks.len(), 4);
    assert!(!result.seeds.is_empty());
    assert_eq!(flags.limit, 4);
    assert!(!flags.partial);
    assert_eq!(flags.provider, "fixed");
}

#[tokio::test]
async fn test_recommend_partial_result() {
    let (server, _temp) = create_full_server(fixed_catalog(&["only"]));

    let response = server
        .post("/api/v1/recommend")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "selected": [{"label": "sadness", "probability": 1.0}],
            "limit": 3
        })))
        .await;

    response.assert_status_ok();
    let result: RecommendationResult = decode(&response);
    let flags: RecommendFlags = decode(&response);
    assert_eq!(result.total, 1);
    assert!(flags.partial);
}

#[tokio::test]
async fn test_recommend_invalid_input() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    for body in [
        serde_json::json!({ "selected": [] }),
        serde_json::json!({ "selected": [{"label": "unknown_tag", "probability": 0.5}] }),
        serde_json::json!({ "selected": [{"label": "joy", "probability": 1.5}] }),
        serde_json::json!({ "selected": [{"label": "joy", "probability": 0.5}], "limit": 0 }),
    ] {
        let response = server
            .post("/api/v1/recommend")
            .content_type("application/msgpack")
            .bytes(msgpack_bytes(&body))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "INVALID_INPUT");
    }
}

#[tokio::test]
async fn test_recommend_catalog_failure() {
    let (server, _temp) = create_full_server(Arc::new(DownCatalog));

    let response = server
        .post("/api/v1/recommend")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "selected": [{"label": "anger", "probability": 0.6}]
        })))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&response), "CATALOG_UNAVAILABLE");
}

#[tokio::test]
async fn test_recommend_rejects_json_body() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server
        .post("/api/v1/recommend")
        .json(&serde_json::json!({ "selected": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "BAD_REQUEST");
}

#[tokio::test]
async fn test_genres_endpoint() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server.get("/api/v1/genres").await;

    response.assert_status_ok();
    let body: GenresResponse = decode(&response);
    assert_eq!(body.provider, "fixed");
    assert_eq!(body.genres, vec!["pop", "sad"]);
}

#[tokio::test]
async fn test_genres_unsupported_by_provider() {
    let (server, _temp) = create_full_server(Arc::new(DownCatalog));

    let response = server.get("/api/v1/genres").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_without_classifier() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/analyze")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({ "text": "what a day" })))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&response), "CLASSIFIER_UNAVAILABLE");
}

#[tokio::test]
async fn test_analyze_threshold_mode() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server
        .post("/api/v1/analyze")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "text": "best day ever",
            "topk": 0,
            "threshold": 0.3
        })))
        .await;

    response.assert_status_ok();
    let body: AnalyzeResponse = decode(&response);
    let labels: Vec<_> = body.predictions.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["joy", "excitement"]);
    assert_eq!(body.all_probabilities.len(), 28);
}

#[tokio::test]
async fn test_analyze_empty_text() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server
        .post("/api/v1/analyze")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({ "text": "  " })))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_diary_lifecycle() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    for (date, content) in [("2024-01-01", "new year"), ("2024-01-03", "third")] {
        let response = server
            .post("/api/v1/users/42/diaries")
            .content_type("application/msgpack")
            .bytes(msgpack_bytes(&serde_json::json!({
                "date": date,
                "content": content,
                "emotion": "joy"
            })))
            .await;
        response.assert_status_ok();
    }

    // Same date again replaces the entry in place
    let response = server
        .post("/api/v1/users/42/diaries")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "date": "2024-01-01",
            "content": "edited"
        })))
        .await;
    response.assert_status_ok();
    let edited: DiaryEntry = decode(&response);
    assert_eq!(edited.content, "edited");
    assert_eq!(edited.emotion, None);

    let response = server.get("/api/v1/users/42/diaries").await;
    response.assert_status_ok();
    let list: DiaryListResponse = decode(&response);
    assert_eq!(list.count, 2);
    assert_eq!(list.entries[0].content, "third");

    let response = server
        .get("/api/v1/users/42/diaries")
        .add_query_param("limit", 1)
        .await;
    let list: DiaryListResponse = decode(&response);
    assert_eq!(list.count, 1);

    let response = server.get("/api/v1/users/42/diaries/2024-01-01").await;
    response.assert_status_ok();
    let entry: DiaryEntry = decode(&response);
    assert_eq!(entry.id, edited.id);

    let response = server.delete("/api/v1/users/42/diaries/2024-01-01").await;
    response.assert_status_ok();
    let deleted: DiaryDeleteResponse = decode(&response);
    assert!(deleted.deleted);

    let response = server.get("/api/v1/users/42/diaries/2024-01-01").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_diary_unparsable_date_uses_today() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server
        .post("/api/v1/users/7/diaries")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "date": "yesterday-ish",
            "content": "hello"
        })))
        .await;

    response.assert_status_ok();
    let entry: DiaryEntry = decode(&response);
    assert_eq!(entry.date, chrono::Utc::now().date_naive());
}

#[tokio::test]
async fn test_diary_rejects_unknown_emotion() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server
        .post("/api/v1/users/7/diaries")
        .content_type("application/msgpack")
        .bytes(msgpack_bytes(&serde_json::json!({
            "content": "hello",
            "emotion": "ennui"
        })))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "INVALID_INPUT");
}

#[tokio::test]
async fn test_diary_bad_path_date() {
    let (server, _temp) = create_full_server(fixed_catalog(&["a"]));

    let response = server.get("/api/v1/users/7/diaries/13-13-2024").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_diary_without_store() {
    let server = create_test_server();

    let response = server.get("/api/v1/users/1/diaries").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&response), "DIARY_UNAVAILABLE");
}
