//! Salary Predictor web server
//!
//! Serves the HTML pages and a small JSON API over a predictor loaded once
//! at start-up.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use crate::export::{ENCODERS_FILE_NAME, MODEL_FILE_NAME};
use crate::inference::Predictor;
use crate::preprocessing::CleaningConfig;
use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub max_upload_size: usize,
    /// Missing-value policy for uploaded batches
    pub cleaning: CleaningConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(MODEL_FILE_NAME)),
            encoders_path: std::env::var("ENCODERS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(ENCODERS_FILE_NAME)),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20 * 1024 * 1024), // 20MB
            cleaning: CleaningConfig::default(),
        }
    }
}

/// Load the artifacts and serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let predictor = Predictor::load(&config.model_path, &config.encoders_path)
        .with_context(|| {
            format!(
                "failed to load artifacts {} and {}",
                config.model_path.display(),
                config.encoders_path.display()
            )
        })?
        .with_cleaning(config.cleaning.clone())?;

    let state = Arc::new(AppState::new(config.clone(), Arc::new(predictor)));
    let app = create_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        model = %state.predictor.model_name(),
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        started_at = %state.started_at.to_rfc3339(),
        "Salary Predictor server starting"
    );
    info!(url = %format!("http://{}", addr), "Web UI available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening");

    let shutdown_state = Arc::clone(&state);
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        info!(
            uptime_secs = shutdown_state.uptime_secs(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
