use crate::ingest::{LogMessageHandler, TelemetryProcessor};
use crate::liveness::{HealthReport, LivenessMonitor};
use crate::message::{LogRecord, RequestHeader, ResponseEnvelope, TelemetryBatch, TelemetryRecord};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Header carrying the sending application's id
pub const SOURCE_APP_HEADER: &str = "x-source-app-id";

/// Shared state for the ingestion API
#[derive(Clone)]
pub struct AppState {
    pub logs: LogMessageHandler,
    pub telemetry: TelemetryProcessor,
    pub liveness: LivenessMonitor,
}

fn source_app_id(headers: &HeaderMap, request_header: &RequestHeader) -> String {
    headers
        .get(SOURCE_APP_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| request_header.app_id.clone())
}

fn envelope_response(envelope: Option<ResponseEnvelope>) -> Response {
    match envelope {
        Some(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// POST /v1/logs
pub async fn post_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(record): Json<LogRecord>,
) -> Response {
    let source = source_app_id(&headers, &record.request_header);
    envelope_response(state.logs.handle(record, &source).await)
}

/// POST /v1/telemetry
pub async fn post_telemetry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(record): Json<TelemetryRecord>,
) -> Response {
    let source = source_app_id(&headers, &record.request_header);
    let envelope = state
        .telemetry
        .process(record, &source)
        .await
        .map(|(_, envelope)| envelope);
    envelope_response(envelope)
}

/// POST /v1/telemetry/batch
pub async fn post_telemetry_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(batch): Json<TelemetryBatch>,
) -> Response {
    let source = source_app_id(&headers, &batch.request_header);
    let envelope = state.telemetry.process_batch(batch, &source).await;
    envelope_response(Some(envelope))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.liveness.check().await;
    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
