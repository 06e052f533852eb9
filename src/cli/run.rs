use crate::config::parse::load_config;
use crate::config::types::Config;
use crate::downlink::{transfer, DownlinkDispatcher};
use crate::ingest::{LogMessageHandler, TelemetryProcessor};
use crate::liveness::LivenessMonitor;
use crate::pipeline::{ingestion_queue, LogWriter, RotationManager};
use crate::plugin::builtin::registrations_from_config;
use crate::plugin::PluginChain;
use crate::web::{run_server, AppState};
use chrono::Utc;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config not found; searched ~/.config/logwell/config.yml and /etc/logwell/config.yml (use --config <path> or run 'logwell config init')")]
    ConfigNotFound,

    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("downlink setup error: {0}")]
    Downlink(#[from] crate::downlink::DownlinkError),

    #[error("invalid listen address '{0}'")]
    Listen(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("web server error: {0}")]
    WebServer(#[source] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), RunError> {
    let config_path = config_path.ok_or(RunError::ConfigNotFound)?;
    run_sidecar(&config_path).await
}

async fn run_sidecar(config_path: &Path) -> Result<(), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(config_path)?;

    let listen: SocketAddr = config
        .web
        .listen
        .parse()
        .map_err(|_| RunError::Listen(config.web.listen.clone()))?;
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|source| RunError::Bind { addr: listen, source })?;

    let plugins = PluginChain::new(registrations_from_config(&config.plugins));
    info!(plugins = plugins.len(), "Plugin registry loaded");

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        shutdown.cancel();
    });

    serve(config, plugins, listener, cancel).await
}

/// Run the writer loop and the ingestion API until `cancel` fires or the API
/// fails.
///
/// The API drains its in-flight requests first; the writer is stopped after
/// that, so every acknowledged record reaches the final drain.
pub async fn serve(
    config: Config,
    plugins: PluginChain,
    listener: TcpListener,
    cancel: CancellationToken,
) -> Result<(), RunError> {
    let output_dir = config.storage.output_dir.clone();
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|source| RunError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

    let (queue, receiver) = ingestion_queue();

    let transfer = transfer::from_config(&config.downlink.transport, &output_dir)?;
    let dispatcher = DownlinkDispatcher::new(&output_dir, &config.downlink, transfer);
    let rotation = RotationManager::from_config(&config.storage, Utc::now());
    let writer = LogWriter::new(
        receiver,
        rotation,
        plugins.clone(),
        dispatcher,
        config.pipeline.heartbeat_interval(),
    );

    info!(dir = %output_dir.display(), "Starting log writer");
    let writer_cancel = CancellationToken::new();
    let writer_handle = tokio::spawn(writer.run(writer_cancel.clone()));

    let state = AppState {
        logs: LogMessageHandler::new(plugins.clone(), queue.clone()),
        telemetry: TelemetryProcessor::new(plugins, queue, config.pipeline.mirror_telemetry_to_log),
        liveness: LivenessMonitor::new(&output_dir),
    };

    let server_result = run_server(listener, state, cancel).await;
    if let Err(e) = &server_result {
        error!(error = %e, "Ingestion API stopped unexpectedly");
    }

    writer_cancel.cancel();
    writer_handle.await?;
    info!("Shutdown complete");

    server_result.map_err(RunError::WebServer)
}
