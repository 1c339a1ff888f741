//! Upload and convert handlers.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use convertino_core::{ConvertedFile, MediaKind, OrchestratorError};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::state::AppState;

/// Read size for streamed downloads.
const CHUNK_SIZE: usize = 64 * 1024;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Stored name to pass to `/convert/{filename}`.
    pub filename: String,
    pub extension: String,
    pub kind: MediaKind,
    pub size_bytes: u64,
    pub target_formats: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    #[serde(default)]
    pub output_format: Option<String>,
}

type PlainError = (StatusCode, String);

fn error_response(err: OrchestratorError) -> PlainError {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Store an uploaded file as an original
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, PlainError> {
    let mut file: Option<(String, Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err((e.status(), e.body_text())),
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        file = Some((filename, data));
        break;
    }

    let Some((filename, data)) = file else {
        return Err((StatusCode::BAD_REQUEST, "No file part.".to_string()));
    };
    if filename.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No selected file.".to_string()));
    }

    let stored = state
        .orchestrator()
        .accept_upload(&filename, &data)
        .await
        .map_err(error_response)?;

    Ok(Json(UploadResponse {
        target_formats: stored.kind.target_formats(),
        filename: stored.name,
        extension: stored.extension,
        kind: stored.kind,
        size_bytes: stored.size_bytes,
    }))
}

/// Convert a stored original and send the result as an attachment
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Form(form): Form<ConvertForm>,
) -> Result<Response, PlainError> {
    let target = form
        .output_format
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Missing output_format.".to_string()))?;

    let converted = state
        .orchestrator()
        .convert(&filename, &target)
        .await
        .map_err(error_response)?;

    attachment(converted).await
}

/// Streams the converted file; the body owns it, so it is deleted once the
/// stream finishes or the client goes away.
async fn attachment(converted: ConvertedFile) -> Result<Response, PlainError> {
    let file = converted.open().await.map_err(|e| {
        warn!("Failed to open {}: {}", converted.path().display(), e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error during conversion: {}", e),
        )
    })?;
    let length = file.metadata().await.ok().map(|m| m.len());

    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(converted.download_name())
    );
    let content_type = converted.content_type();

    let stream = futures::stream::unfold(Some((file, converted)), |state| async move {
        let (mut file, converted) = state?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => {
                debug!("Finished sending {}", converted.download_name());
                None
            }
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Bytes::from(buf)), Some((file, converted))))
            }
            Err(e) => Some((Err::<Bytes, std::io::Error>(e), None)),
        }
    });

    let mut response = (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response();

    if let Some(length) = length {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, header::HeaderValue::from(length));
    }

    Ok(response)
}
