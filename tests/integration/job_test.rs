//! Integration tests for the job lifecycle over HTTP.

mod helpers;

use axum::http::{StatusCode, header};

#[tokio::test]
async fn test_upload_then_status_is_uploaded() {
    let app = helpers::TestApp::new().await;
    let id = app.upload_document().await;

    let response = app
        .request("GET", &format!("/api/jobs/{id}/status"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "uploaded");
    assert_eq!(response.body["file_id"], id.as_str());
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_upload_rejects_other_extensions() {
    let app = helpers::TestApp::new().await;

    let response = app.upload("notes.docx", b"PK\x03\x04").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = helpers::TestApp::with_config(|c| c.storage.max_upload_size_bytes = 16).await;

    let response = app.upload("big.pdf", &[b'x'; 64]).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_process_and_download() {
    let app = helpers::TestApp::new().await;
    let id = app.upload_document().await;

    let response = app
        .request("POST", &format!("/api/jobs/{id}/process"))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["status"], "completed");
    assert_eq!(response.body["output_available"], true);

    let status = app
        .request("GET", &format!("/api/jobs/{id}/status"))
        .await;
    assert_eq!(status.body["status"], "completed");
    assert_eq!(status.body["output_available"], true);

    let download = app
        .request("GET", &format!("/api/jobs/{id}/download"))
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(
        download.headers[header::CONTENT_TYPE].to_str().unwrap(),
        "application/pdf"
    );
    let disposition = download
        .headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains(&format!("cleaned_{id}.pdf")));
    assert_eq!(download.raw, b"%PDF-1.7 tracked changes");
}

#[tokio::test]
async fn test_unknown_job_reports_not_found() {
    let app = helpers::TestApp::new().await;
    let id = "0b6f1c52-9a4e-4d8e-a1f3-2c7d9e0b5a61";

    let status = app
        .request("GET", &format!("/api/jobs/{id}/status"))
        .await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["status"], "not_found");

    let process = app
        .request("POST", &format!("/api/jobs/{id}/process"))
        .await;
    assert_eq!(process.status, StatusCode::NOT_FOUND);

    let download = app
        .request("GET", &format!("/api/jobs/{id}/download"))
        .await;
    assert_eq!(download.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/jobs/not-a-job/status").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_before_processing_is_not_found() {
    let app = helpers::TestApp::new().await;
    let id = app.upload_document().await;

    let response = app
        .request("GET", &format!("/api/jobs/{id}/download"))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_debug_reports_artifacts() {
    let app = helpers::TestApp::new().await;
    let id = app.upload_document().await;

    let response = app.request("GET", &format!("/api/jobs/{id}/debug")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["input_exists"], true);
    assert_eq!(response.body["output_exists"], false);
    assert_eq!(response.body["in_flight"], false);
}
