use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
///
/// All settings can be configured via environment variables with the `EMOTUNE_` prefix.
/// For example: `EMOTUNE_SERVER__PORT=8097`, `EMOTUNE_CATALOG__PROVIDER=local`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Recommendation engine tunables
    #[serde(default)]
    pub recommend: RecommendConfig,

    /// Emotion profile table overrides
    #[serde(default)]
    pub profiles: ProfilesConfig,

    /// Catalog provider selection and credentials
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Remote emotion classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Diary storage
    #[serde(default)]
    pub diary: DiaryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8097
}

impl ServerConfig {
    /// Returns the socket address for binding the server
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    /// Track count when a request omits `limit`
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Larger requested limits are clamped to this
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Number of most probable emotions considered per request
    #[serde(default = "default_max_emotions")]
    pub max_emotions: usize,

    /// Maximum seeds sent to the catalog
    #[serde(default = "default_seed_cap")]
    pub seed_cap: usize,

    /// Bound on each catalog call
    #[serde(default = "default_catalog_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_emotions: default_max_emotions(),
            seed_cap: default_seed_cap(),
            timeout_ms: default_catalog_timeout_ms(),
        }
    }
}

fn default_limit() -> usize {
    4
}

fn default_max_limit() -> usize {
    50
}

fn default_max_emotions() -> usize {
    3
}

fn default_seed_cap() -> usize {
    5
}

fn default_catalog_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilesConfig {
    /// TOML or JSON file merged onto the built-in profile table
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Which catalog provider backs recommendations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Spotify,
    Local,
    /// Recommendations are disabled
    #[default]
    None,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub provider: CatalogKind,

    #[serde(default)]
    pub spotify: SpotifyConfig,

    #[serde(default)]
    pub local: LocalCatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Web API base URL
    #[serde(default = "default_spotify_api_url")]
    pub api_url: String,

    /// Client-credentials token endpoint
    #[serde(default = "default_spotify_token_url")]
    pub token_url: String,

    /// Strict-mode window around each target, as a fraction of the feature range
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_url: default_spotify_api_url(),
            token_url: default_spotify_token_url(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_spotify_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_tolerance() -> f32 {
    0.15
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalCatalogConfig {
    /// JSON file with feature-annotated tracks
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

impl Default for LocalCatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            tolerance: default_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Inference endpoint; analysis is disabled when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Minimum probability in threshold mode
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Default number of predictions; 0 selects threshold mode
    #[serde(default = "default_topk")]
    pub topk: usize,

    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: None,
            threshold: default_threshold(),
            topk: default_topk(),
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

fn default_threshold() -> f32 {
    0.30
}

fn default_topk() -> usize {
    3
}

fn default_classifier_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiaryConfig {
    /// Enable diary storage
    #[serde(default = "default_diary_enabled")]
    pub enabled: bool,

    /// Database file; defaults to the platform data directory
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_diary_enabled(),
            db_path: None,
        }
    }
}

fn default_diary_enabled() -> bool {
    true
}

impl DiaryConfig {
    /// Configured database path, or `diary.redb` under the platform data dir
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        if let Some(proj_dirs) = ProjectDirs::from("com", "emotune", "emotune") {
            proj_dirs.data_dir().join("diary.redb")
        } else {
            PathBuf::from("./data/diary.redb")
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables should be prefixed with `EMOTUNE_` and use
    /// double underscores for nested values:
    /// - `EMOTUNE_SERVER__PORT` -> server.port
    /// - `EMOTUNE_CATALOG__PROVIDER` -> catalog.provider
    /// - `EMOTUNE_CATALOG__SPOTIFY__CLIENT_ID` -> catalog.spotify.client_id
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("EMOTUNE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
