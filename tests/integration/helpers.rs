//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::watch;
use tower::ServiceExt;

use docscrub_api::{AppState, build_app};
use docscrub_core::config::AppConfig;
use docscrub_service::JobServiceBuilder;

const BOUNDARY: &str = "docscrub-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Holds the artifact directories
    _dir: TempDir,
    /// Keeps background cleanup alive
    _shutdown: watch::Sender<bool>,
}

impl TestApp {
    /// Create a new test application backed by a temporary artifact tree
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.upload_dir = dir.path().join("uploads").display().to_string();
        config.storage.output_dir = dir.path().join("outputs").display().to_string();
        adjust(&mut config);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let jobs = JobServiceBuilder::new(config.clone())
            .build(shutdown_rx)
            .await
            .expect("Failed to build job service");

        let cors = config.server.cors.clone();
        let router = build_app(AppState::new(config.clone(), jobs), &cors);

        Self {
            router,
            config,
            _dir: dir,
            _shutdown: shutdown,
        }
    }

    /// Make an HTTP request without a body
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `data` as the `file` field of a multipart form
    pub async fn upload(&self, file_name: &str, data: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload a small document and return its job identifier
    pub async fn upload_document(&self) -> String {
        let response = self.upload("report.pdf", b"%PDF-1.7 tracked changes").await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Upload failed: {:?}",
            response.body
        );
        response.body["file_id"]
            .as_str()
            .expect("No file_id in upload response")
            .to_string()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw: body_bytes.to_vec(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body bytes
    pub raw: Vec<u8>,
}
