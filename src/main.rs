//! Emotune - Entry Point

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emotune::catalog::{CatalogProvider, LocalCatalog, SpotifyCatalog};
use emotune::classifier::HttpClassifier;
use emotune::config::{AppConfig, CatalogKind};
use emotune::diary::RedbDiaryStore;
use emotune::emotion::ProfileTable;
use emotune::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();

    info!("Starting Emotune");

    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config from environment: {e}, using defaults");
        AppConfig::default()
    });

    info!(
        catalog = ?config.catalog.provider,
        max_emotions = config.recommend.max_emotions,
        timeout_ms = config.recommend.timeout_ms,
        "Configuration loaded"
    );

    // An invalid profile table is fatal
    let profiles = match &config.profiles.path {
        Some(path) => ProfileTable::load_with_overrides(path)
            .with_context(|| format!("Invalid emotion profiles in {}", path.display()))?,
        None => ProfileTable::builtin(),
    };
    info!(
        profiles = profiles.len(),
        overrides = config.profiles.path.is_some(),
        "Emotion profiles loaded"
    );

    let mut state = server::AppState::new(config.clone()).with_profiles(profiles);

    if let Some(catalog) = init_catalog(&config) {
        info!(provider = catalog.name(), "Catalog provider ready");
        state = state.with_catalog(catalog);
    }

    match HttpClassifier::from_config(&config.classifier) {
        Ok(Some(classifier)) => state = state.with_classifier(Arc::new(classifier)),
        Ok(None) => info!("No classifier configured, /analyze disabled"),
        Err(e) => error!(error = %e, "Failed to initialize classifier"),
    }

    if config.diary.enabled {
        let db_path = config.diary.resolved_db_path();
        match RedbDiaryStore::new(&db_path) {
            Ok(store) => state = state.with_diary_store(Arc::new(store)),
            Err(e) => error!(path = %db_path.display(), error = %e, "Failed to open diary store"),
        }
    }

    // Create router
    let app = server::create_router(state);

    // Bind to socket
    let addr = config
        .server
        .socket_addr()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(%addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Build the configured catalog provider, logging instead of failing so the
/// rest of the API stays available
fn init_catalog(config: &AppConfig) -> Option<Arc<dyn CatalogProvider>> {
    match config.catalog.provider {
        CatalogKind::None => {
            info!("No catalog provider configured, /recommend disabled");
            None
        }
        CatalogKind::Spotify => match SpotifyCatalog::new(config.catalog.spotify.clone()) {
            Ok(catalog) => Some(Arc::new(catalog)),
            Err(e) => {
                error!(error = %e, "Failed to initialize Spotify catalog");
                None
            }
        },
        CatalogKind::Local => {
            let local = &config.catalog.local;
            let Some(path) = &local.path else {
                error!("Local catalog selected but EMOTUNE_CATALOG__LOCAL__PATH is not set");
                return None;
            };
            match LocalCatalog::from_path(path, local.tolerance) {
                Ok(catalog) => Some(Arc::new(catalog)),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to load local catalog");
                    None
                }
            }
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emotune=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
