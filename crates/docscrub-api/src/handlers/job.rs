//! Job upload, processing, status, download, and diagnostics handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use tracing::info;

use docscrub_core::error::AppError;
use docscrub_core::types::JobStatus;
use docscrub_service::{JobDiagnostics, JobStatusReport, UploadReceipt};

use crate::dto::response::ProcessResponse;
use crate::error::ApiError;
use crate::extractors::parse_job_id;
use crate::state::AppState;

/// POST /api/upload
///
/// Expects a multipart body with the document in the `file` field.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    let mut file_name: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        file_name = Some(field.file_name().unwrap_or_default().to_string());
        data = Some(field.bytes().await.map_err(multipart_error)?);
    }

    let (Some(file_name), Some(data)) = (file_name, data) else {
        return Err(AppError::validation("Missing 'file' field").into());
    };

    let receipt = state.jobs.upload(&file_name, data).await?;
    Ok(Json(receipt))
}

/// POST /api/jobs/{id}/process
pub async fn process(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let id = parse_job_id(&id)?;
    info!(job_id = %id, "Processing requested");

    let artifact = state.jobs.start_processing(id).await?;

    Ok(Json(ProcessResponse {
        file_id: id,
        status: JobStatus::Completed,
        output_available: true,
        processing_time: (artifact.elapsed.as_secs_f64() * 100.0).round() / 100.0,
        message: "Document processed successfully".to_string(),
    }))
}

/// GET /api/jobs/{id}/status
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatusReport>, ApiError> {
    let id = parse_job_id(&id)?;
    Ok(Json(state.jobs.status_report(id).await))
}

/// GET /api/jobs/{id}/download
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_job_id(&id)?;
    let output = state.jobs.open_output(id).await?;

    let content_type = match state.config.storage.artifact_extension.as_str() {
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", output.file_name),
        );
    if let Some(size) = output.size {
        builder = builder.header(header::CONTENT_LENGTH, size);
    }

    let response = builder
        .body(Body::from_stream(output.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// GET /api/jobs/{id}/debug
pub async fn debug(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDiagnostics>, ApiError> {
    let id = parse_job_id(&id)?;
    Ok(Json(state.jobs.diagnostics(id).await))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Upload exceeds the size limit").into()
    } else {
        AppError::validation(format!("Multipart error: {}", err.body_text())).into()
    }
}
