//! Image analysis endpoints
//!
//! Accepts an image either as a multipart upload (field name `image`) or
//! as a base64 JSON payload, runs it through the analysis orchestrator,
//! and returns the verdict as `{success, result}`.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

use agroguard_common::models::AnalysisResult;

use crate::analysis::ProviderError;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Transport-level cap sized above the providers' 10 MiB image limit: a
/// 10 MiB image grows by a third under base64, and the envelope adds
/// framing. Keeping the cap above that lets the provider's own size check
/// produce the `{success:false, error}` rejection instead of a bare 413.
const UPLOAD_LIMIT_BYTES: usize = 15 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-crop", post(analyze_upload))
        .route("/analyze-crop-base64", post(analyze_base64))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
}

#[derive(Debug, Serialize)]
struct AnalysisEnvelope {
    success: bool,
    result: AnalysisResult,
    provider: &'static str,
}

async fn analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart upload: {}", e)))?
    {
        if field.name() == Some("image") {
            if let Some(content_type) = field.content_type() {
                if !content_type.starts_with("image/") {
                    return Err(ApiError::BadRequest(
                        "Only image files are allowed".to_string(),
                    ));
                }
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read image field: {}", e)))?;
            image = Some(bytes.to_vec());
            break;
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;
    run_analysis(&state, &image).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Base64Request {
    image_base64: String,
}

async fn analyze_base64(
    State(state): State<AppState>,
    Json(request): Json<Base64Request>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    // tolerate data URLs ("data:image/jpeg;base64,...")
    let encoded = match request.image_base64.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => request.image_base64.as_str(),
    };

    let image = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::BadRequest("Invalid base64 image data".to_string()))?;
    run_analysis(&state, &image).await
}

async fn run_analysis(state: &AppState, image: &[u8]) -> ApiResult<Json<AnalysisEnvelope>> {
    let outcome = state.orchestrator.analyze(image).await.map_err(|e| match e {
        ProviderError::InvalidImage(msg) => ApiError::BadRequest(msg),
        other => ApiError::Internal(format!("Analysis failed: {}", other)),
    })?;

    info!(
        provider = outcome.provider,
        detected = outcome.result.detected,
        confidence = outcome.result.confidence,
        "analysis complete"
    );

    Ok(Json(AnalysisEnvelope {
        success: true,
        result: outcome.result,
        provider: outcome.provider,
    }))
}
