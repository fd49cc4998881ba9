//! File validation endpoint
//!
//! POST /validate: decode a base64 payload, classify its content type and
//! report whether it is acceptable as CSV.

use axum::{extract::State, routing::post, Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use filevet_common::detect;

/// POST /validate request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Base64-encoded file content
    pub file_content: Option<String>,
    /// Original filename, used as a weak hint by the CSV heuristic
    pub filename: Option<String>,
}

/// POST /validate response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// Whether the content is acceptable as CSV
    pub success: bool,
    /// Human-readable verdict
    pub message: String,
    /// Detected MIME type, reported on success and failure alike
    pub mimetype: String,
    /// Filename echoed back from the request
    pub filename: Option<String>,
}

/// POST /validate
///
/// The transport boundary owns payload decoding and the size cap; the
/// detection engine only ever sees an already-bounded byte buffer.
pub async fn validate_file(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> ApiResult<Json<ValidateResponse>> {
    let encoded = request
        .file_content
        .ok_or_else(|| ApiError::BadRequest("Missing file_content in request".to_string()))?;

    // Base64 inflates by 4/3, so an encoded length over this bound cannot
    // decode under the cap; reject before allocating for the decode
    let max_bytes = state.config.max_upload_bytes;
    let encoded_cap = max_bytes / 3 * 4 + 4;
    if encoded.len() > encoded_cap {
        return Err(ApiError::PayloadTooLarge(format!(
            "Encoded content is {} bytes, limit is {}",
            encoded.len(),
            encoded_cap
        )));
    }

    let buffer = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 content: {}", e)))?;

    if buffer.len() > max_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "Decoded payload is {} bytes, limit is {}",
            buffer.len(),
            max_bytes
        )));
    }

    let report = detect::classify(
        &buffer,
        request.filename.as_deref(),
        &state.config.thresholds,
    );

    info!(
        filename = request.filename.as_deref().unwrap_or("unknown"),
        mimetype = %report.mime_type,
        success = report.success,
        size = buffer.len(),
        "validation complete"
    );

    if !report.success {
        let mut last_error = state.last_error.write().await;
        *last_error = Some(report.message.clone());
    }

    Ok(Json(ValidateResponse {
        success: report.success,
        message: report.message,
        mimetype: report.mime_type,
        filename: request.filename,
    }))
}

/// Build validation routes
pub fn validate_routes() -> Router<AppState> {
    Router::new().route("/validate", post(validate_file))
}
