//! Integration tests for the health check.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["service"], "docscrub");
    assert_eq!(response.body["transformer"], "passthrough");
    assert_eq!(
        response.body["processing_timeout_seconds"],
        app.config.processing.timeout_seconds
    );
}

#[tokio::test]
async fn test_root_serves_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["service"], "docscrub");
}

#[tokio::test]
async fn test_health_counts_jobs() {
    let app = helpers::TestApp::new().await;
    app.upload_document().await;

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.body["metrics"]["jobs_created"], 1);
}
