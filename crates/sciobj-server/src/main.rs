//! Science Objects Server Binary
//!
//! Runs the HTTP server for authorization, token issuance and dataset releases.

use std::env;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use sciobj_server::{create_router, AppState, MemoryStore, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("SCIOBJ_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };

    // Initialize storage and application state
    let state = match build_state(&config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!(error = %e, "Failed to initialize server");
            std::process::exit(1);
        }
    };

    info!(
        port = config.port,
        introspection_url = %config.introspection.endpoint_url,
        enforce_token_expiry = config.tokens.enforce_expiry,
        ownership_cache = config.hierarchy.cache_ttl.is_some(),
        "Starting Science Objects server"
    );

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Science Objects server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(feature = "postgres")]
async fn build_state(config: &ServerConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(sciobj_server::storage::PostgresStore::new(url).await?);
            info!("Using PostgreSQL storage");
            Ok(AppState::from_config(config, store)?)
        }
        None => {
            info!("SCIOBJ_DATABASE_URL not set, using in-memory storage");
            Ok(AppState::from_config(config, Arc::new(MemoryStore::new()))?)
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_state(config: &ServerConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    if config.database_url.is_some() {
        tracing::warn!("SCIOBJ_DATABASE_URL is set but the postgres feature is disabled; using in-memory storage");
    }
    Ok(AppState::from_config(config, Arc::new(MemoryStore::new()))?)
}
