use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convertino_core::converter::FfmpegTranscoder;
use convertino_core::{
    load_config_or_default, validate_config, Backends, ConversionOrchestrator, FileRegistry,
    RetentionSweeper, Storage, Transcoder,
};
use convertino_server::api::create_router;
use convertino_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("CONVERTINO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration (file is optional, defaults apply)
    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Upload directory: {:?}", config.storage.upload_dir);
    info!(
        "Retention: originals {}s, converted {}s, sweep every {}s",
        config.retention.original_max_age_secs,
        config.retention.derived_max_age_secs,
        config.retention.sweep_interval_secs
    );

    // Create storage directory
    let storage = Storage::new(&config.storage.upload_dir);
    storage
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create {:?}", config.storage.upload_dir))?;

    // Probe ffmpeg; image conversion still works without it
    let transcoder = FfmpegTranscoder::new(config.converter.clone());
    match transcoder.version().await {
        Ok(version) => info!("Using {}", version),
        Err(e) => warn!(
            "ffmpeg not usable, audio and video conversions will fail: {}",
            e
        ),
    }

    let registry = Arc::new(FileRegistry::new());
    let orchestrator = Arc::new(ConversionOrchestrator::new(
        storage.clone(),
        Arc::clone(&registry),
        Backends::with_transcoder(Arc::new(transcoder)),
        config.storage.max_upload_bytes,
    ));

    // Start the retention sweeper
    let sweeper = RetentionSweeper::new(storage, registry, config.retention.clone());
    sweeper.start().await;

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), orchestrator));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    info!("Server shutting down...");
    sweeper.stop().await;

    served
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
