//! POST /upload: add a PDF to the knowledge base.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: String,
    pub chunks: u64,
}

/// Handler: POST /upload (multipart, field `file`)
///
/// The upload is spooled to a temporary file that is removed when the
/// handler returns, whether ingestion succeeded or not.
///
/// # Example
/// ```bash
/// curl -F file=@manual.pdf http://127.0.0.1:8000/upload
/// ```
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "upload: skipping unrelated field");
            continue;
        }
        let name = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field.bytes().await?.to_vec();
        return ingest_upload(state, name, bytes).await.map(Json);
    }

    Err(AppError::BadRequest(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// Spools `bytes` to a temp file and ingests it under `name`.
pub async fn ingest_upload(
    state: Arc<AppState>,
    name: String,
    bytes: Vec<u8>,
) -> AppResult<UploadResponse> {
    let tmp = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| AppError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "IO_ERROR",
            message: format!("failed to create temporary file: {e}"),
        })?;
    let path = tmp.path().to_path_buf();
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "IO_ERROR",
            message: format!("failed to spool upload: {e}"),
        })?;

    let chunks = state.rag.ingest_pdf(path, &name).await?;
    info!(file = %name, size = bytes.len(), chunks, "upload ingested");

    Ok(UploadResponse {
        status: "success",
        message: format!("File {name} added to knowledge base!"),
        chunks,
    })
}
