//! Request handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use rocr_core::OcrResult;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub engine: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        engine: state.pipeline.engine_name().to_string(),
    })
}

/// POST /extract
///
/// Empty or missing uploads are rejected before the pipeline runs.
pub async fn extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResult>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::BadRequest("missing `file` field".to_string()))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("empty file".to_string()));
    }

    let span = info_span!("extract", request_id = %Uuid::new_v4(), filename = %filename);
    async move {
        info!("Received {} bytes", data.len());
        let result = state.pipeline.process_async(data.to_vec(), filename).await?;
        Ok::<_, ApiError>(Json(result))
    }
    .instrument(span)
    .await
}
