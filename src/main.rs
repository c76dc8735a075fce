use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamcast::{
    config::Config,
    database::Database,
    services::{IngestProbe, LostStreamSweeper, SessionReconciler, StreamService},
    web::{self, AppState},
};

#[derive(Parser)]
#[command(name = "streamcast")]
#[command(version)]
#[command(about = "Live-stream session lifecycle and reconciliation service")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("streamcast={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load_from_file(&cli.config)?;
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config
        .validate()
        .map_err(|message| anyhow::anyhow!("invalid configuration: {message}"))?;

    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    let connection = database.connection();
    let reconciler = Arc::new(SessionReconciler::new(connection.clone()));
    let stream_service = Arc::new(StreamService::new(connection, reconciler.clone()));

    let cancellation_token = CancellationToken::new();
    let sweeper_handle = if config.reconciliation.enabled {
        let probe = Arc::new(IngestProbe::new(
            config.ingest.api_base.clone(),
            config.ingest.recordings_dir.clone(),
            config
                .ingest
                .probe_timeout_duration()
                .context("invalid ingest.probe_timeout")?,
        )?);
        let sweeper = LostStreamSweeper::new(
            reconciler.clone(),
            probe,
            config
                .reconciliation
                .sweep_interval_duration()
                .context("invalid reconciliation.sweep_interval")?,
        );
        let token = cancellation_token.clone();
        Some(tokio::spawn(async move { sweeper.run(token).await }))
    } else {
        info!("reconciliation sweeper disabled by configuration");
        None
    };

    let app = web::router(AppState { stream_service });

    let bind_addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("listening on {bind_addr}");

    let shutdown_token = cancellation_token.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown_token.cancel();
        })
        .await?;

    cancellation_token.cancel();
    if let Some(handle) = sweeper_handle {
        let _ = handle.await;
    }

    info!("streamcast stopped");
    Ok(())
}
