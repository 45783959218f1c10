//! User comment endpoints and the read/reply workflow

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use agroguard_common::models::{Comment, CommentStatus};

use super::{CreatedEnvelope, ItemEnvelope, ListEnvelope, MessageEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/status/:status", get(by_status))
        .route("/user/:user_id", get(by_user))
        .route("/category/:category", get(by_category))
        .route("/:id", get(get_by_id).delete(delete))
        .route("/:id/read", put(mark_read))
        .route("/:id/reply", put(reply))
}

async fn get_all(State(state): State<AppState>) -> Json<ListEnvelope<Comment>> {
    Json(ListEnvelope::new(state.comments.get_all().await))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemEnvelope<Comment>>> {
    let comment = state
        .comments
        .get_by_id(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    Ok(Json(ItemEnvelope::new(comment)))
}

async fn by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Json<ListEnvelope<Comment>>> {
    let status: CommentStatus = serde_json::from_value(Value::String(status))
        .map_err(|_| ApiError::BadRequest("Unknown comment status".to_string()))?;
    Ok(Json(ListEnvelope::new(state.comments.by_status(status).await)))
}

async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ListEnvelope<Comment>> {
    Json(ListEnvelope::new(state.comments.by_user(&user_id).await))
}

async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<ListEnvelope<Comment>> {
    Json(ListEnvelope::new(state.comments.by_category(&category).await))
}

async fn create(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedEnvelope<Comment>>)> {
    let user_id = body.get("userId").and_then(Value::as_str).unwrap_or("");
    let message = body.get("message").and_then(Value::as_str).unwrap_or("");
    if user_id.trim().is_empty() || message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "User ID and message are required".to_string(),
        ));
    }

    // comments always enter the queue unread
    if let Value::Object(fields) = &mut body {
        fields.insert("status".to_string(), json!("unread"));
        fields.insert("submittedAt".to_string(), json!(Utc::now()));
    }

    let mut comment: Comment = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid comment data: {}", e)))?;
    let id = state.comments.create(&comment).await?;
    comment.id = id.clone();
    // re-fetch so the response carries the stored timestamps
    let stored = state.comments.get_by_id(&id).await.unwrap_or(comment);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope::new(
            stored,
            "Comment submitted successfully",
        )),
    ))
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    if state.comments.delete(&id).await {
        Ok(Json(MessageEnvelope::new("Comment deleted successfully")))
    } else {
        Err(ApiError::NotFound("Comment not found".to_string()))
    }
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    state.comments.mark_read(&id).await?;
    Ok(Json(MessageEnvelope::new("Comment marked as read")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest {
    reply: Option<String>,
    replied_by: Option<String>,
}

async fn reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<Json<MessageEnvelope>> {
    let reply = request
        .reply
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Reply message is required".to_string()))?;

    state
        .comments
        .mark_replied(&id, reply, request.replied_by)
        .await?;
    Ok(Json(MessageEnvelope::new("Reply sent successfully")))
}
