//! Pending disease submission endpoints and the review workflow

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use agroguard_common::models::{Disease, PendingSubmission, SubmissionStatus};

use super::{CreatedEnvelope, ItemEnvelope, ListEnvelope, MessageEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/status/:status", get(by_status))
        .route("/:id", get(get_by_id).put(update).delete(delete))
        .route("/:id/approve", put(approve))
        .route("/:id/reject", put(reject))
}

async fn get_all(State(state): State<AppState>) -> Json<ListEnvelope<PendingSubmission>> {
    Json(ListEnvelope::new(state.submissions.get_all().await))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemEnvelope<PendingSubmission>>> {
    let submission = state
        .submissions
        .get_by_id(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;
    Ok(Json(ItemEnvelope::new(submission)))
}

async fn by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Json<ListEnvelope<PendingSubmission>>> {
    let status: SubmissionStatus = serde_json::from_value(Value::String(status))
        .map_err(|_| ApiError::BadRequest("Unknown submission status".to_string()))?;
    Ok(Json(ListEnvelope::new(
        state.submissions.by_status(status).await,
    )))
}

async fn create(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedEnvelope<PendingSubmission>>)> {
    let submitted_by = body.get("submittedBy").and_then(Value::as_str).unwrap_or("");
    let crop_type = body.get("cropType").and_then(Value::as_str).unwrap_or("");
    let description = body.get("description").and_then(Value::as_str).unwrap_or("");
    if submitted_by.trim().is_empty() || crop_type.trim().is_empty() || description.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "Submitted by, crop type, and description are required".to_string(),
        ));
    }

    // every submission enters the review queue as pending
    if let Value::Object(fields) = &mut body {
        fields.insert("status".to_string(), json!("pending"));
        fields.insert("submittedAt".to_string(), json!(Utc::now()));
        fields
            .entry("submitterName".to_string())
            .or_insert_with(|| json!("Anonymous"));
    }

    let mut submission: PendingSubmission = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid submission data: {}", e)))?;
    let id = state.submissions.create(&submission).await?;
    submission.id = id.clone();
    // re-fetch so the response carries the stored timestamps
    let stored = state.submissions.get_by_id(&id).await.unwrap_or(submission);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope::new(
            stored,
            "Disease submitted for review",
        )),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<MessageEnvelope>> {
    let Value::Object(patch) = body else {
        return Err(ApiError::BadRequest(
            "Update body must be a JSON object".to_string(),
        ));
    };

    if state.submissions.update(&id, patch).await {
        Ok(Json(MessageEnvelope::new("Submission updated successfully")))
    } else {
        Err(ApiError::NotFound("Submission not found".to_string()))
    }
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    if state.submissions.delete(&id).await {
        Ok(Json(MessageEnvelope::new("Submission deleted successfully")))
    } else {
        Err(ApiError::NotFound("Submission not found".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveRequest {
    disease_data: Option<Disease>,
}

async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<Json<MessageEnvelope>> {
    let disease = body.and_then(|Json(request)| request.disease_data);
    let disease_id = state.submissions.approve(&id, disease).await?;
    Ok(Json(MessageEnvelope::new(format!(
        "Submission approved, disease {} created",
        disease_id
    ))))
}

#[derive(Debug, Default, Deserialize)]
struct RejectRequest {
    reason: Option<String>,
}

async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> ApiResult<Json<MessageEnvelope>> {
    let reason = body.and_then(|Json(request)| request.reason);
    state.submissions.reject(&id, reason).await?;
    Ok(Json(MessageEnvelope::new("Submission rejected")))
}
