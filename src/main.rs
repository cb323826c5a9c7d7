//! DocScrub Server
//!
//! Main entry point that wires the job lifecycle crates together and starts
//! the HTTP server.

use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use docscrub_core::config::AppConfig;
use docscrub_core::error::AppError;
use docscrub_service::JobServiceBuilder;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("DOCSCRUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("DOCSCRUB_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocScrub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 2: Job service ──────────────────────────────────────
    tracing::info!(
        upload_dir = %config.storage.upload_dir,
        output_dir = %config.storage.output_dir,
        "Initializing job service..."
    );
    let jobs = JobServiceBuilder::new(config.clone())
        .build(shutdown_rx)
        .await?;

    // ── Step 3: Background cleanup ───────────────────────────────
    tracing::info!(
        interval_secs = config.cleanup.sweep_interval_seconds,
        retention_minutes = config.cleanup.retention_minutes,
        "Starting background cleanup..."
    );
    let sweep_handle = jobs.start_background_cleanup();

    // ── Step 4: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let cors = config.server.cors.clone();
    let app = docscrub_api::build_app(docscrub_api::AppState::new(config, jobs), &cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("DocScrub server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background cleanup to stop...");
    if tokio::time::timeout(grace, sweep_handle).await.is_err() {
        tracing::warn!("Background cleanup did not stop within {:?}", grace);
    }

    tracing::info!("DocScrub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
