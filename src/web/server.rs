use super::api::{health_check, post_log, post_telemetry, post_telemetry_batch, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/logs", post(post_log))
        .route("/v1/telemetry", post(post_telemetry))
        .route("/v1/telemetry/batch", post(post_telemetry_batch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the ingestion API until `cancel` fires. Returns once every
/// in-flight request has been answered.
pub async fn run_server(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> Result<(), std::io::Error> {
    info!(addr = %listener.local_addr()?, "Ingestion API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
            info!("Ingestion API shutting down gracefully");
        })
        .await
}
