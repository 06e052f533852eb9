use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use logwell::ingest::{LogMessageHandler, TelemetryProcessor};
use logwell::liveness::LivenessMonitor;
use logwell::pipeline::{ingestion_queue, QueueReceiver};
use logwell::plugin::PluginChain;
use logwell::web::{router, AppState};
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &TempDir) -> (Router, QueueReceiver) {
    let (queue, receiver) = ingestion_queue();
    let state = AppState {
        logs: LogMessageHandler::new(PluginChain::empty(), queue.clone()),
        telemetry: TelemetryProcessor::new(PluginChain::empty(), queue, true),
        liveness: LivenessMonitor::new(dir.path()),
    };
    (router(state), receiver)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-source-app-id", "test-app")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_post_log_returns_envelope_and_enqueues() {
    let dir = TempDir::new().unwrap();
    let (app, mut receiver) = app(&dir);

    let response = app
        .oneshot(post_json(
            "/v1/logs",
            serde_json::json!({
                "request_header": { "tracking_id": "t-1", "correlation_id": "c-1" },
                "category": "App",
                "message": "hello",
                "log_level": "info"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "successful");
    assert_eq!(body["tracking_id"], "t-1");
    assert_eq!(body["correlation_id"], "c-1");

    let queued = receiver.try_dequeue().unwrap();
    assert_eq!(queued.message, "hello");
}

#[tokio::test]
async fn test_internal_log_gets_no_content() {
    let dir = TempDir::new().unwrap();
    let (app, mut receiver) = app(&dir);

    let response = app
        .oneshot(post_json(
            "/v1/logs",
            serde_json::json!({ "category": "logwellinternal", "message": "mirrored" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(receiver.try_dequeue().is_some());
}

#[tokio::test]
async fn test_post_telemetry_mirrors_metric() {
    let dir = TempDir::new().unwrap();
    let (app, mut receiver) = app(&dir);

    let response = app
        .oneshot(post_json(
            "/v1/telemetry",
            serde_json::json!({
                "request_header": { "tracking_id": "m-1" },
                "metric_name": "cpu",
                "metric_value": 0.5
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["tracking_id"], "m-1");

    let mirrored = receiver.try_dequeue().unwrap();
    assert_eq!(mirrored.category, "Telemetry");
    assert_eq!(mirrored.message, "0.5");
}

#[tokio::test]
async fn test_post_telemetry_batch_reports_count() {
    let dir = TempDir::new().unwrap();
    let (app, _receiver) = app(&dir);

    let response = app
        .oneshot(post_json(
            "/v1/telemetry/batch",
            serde_json::json!({
                "request_header": { "tracking_id": "b-1" },
                "metrics": [
                    { "metric_name": "cpu", "metric_value": 1.0 },
                    { "metric_name": "mem", "metric_value": 2.0 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tracking_id"], "b-1");
    assert_eq!(body["message"], "processed 2 of 2 metrics");
}

#[tokio::test]
async fn test_health_tracks_file_count() {
    let dir = TempDir::new().unwrap();

    let (app_empty, _rx) = app(&dir);
    let response = app_empty
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    fs::write(dir.path().join("logwell-01-06-24-12.00.00.json"), "").unwrap();

    let (app_one, _rx) = app(&dir);
    let response = app_one
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["file_count"], 1);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, mut receiver) = app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/logs")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(receiver.try_dequeue().is_none());
}
