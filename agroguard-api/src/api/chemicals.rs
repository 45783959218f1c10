//! Chemical catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use agroguard_common::models::Chemical;

use super::{CreatedEnvelope, ItemEnvelope, ListEnvelope, MessageEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/type/:chemical_type", get(by_type))
        .route("/:id", get(get_by_id).put(update).delete(delete))
}

async fn get_all(State(state): State<AppState>) -> Json<ListEnvelope<Chemical>> {
    Json(ListEnvelope::new(state.chemicals.get_all().await))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemEnvelope<Chemical>>> {
    let chemical = state
        .chemicals
        .get_by_id(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Chemical not found".to_string()))?;
    Ok(Json(ItemEnvelope::new(chemical)))
}

async fn by_type(
    State(state): State<AppState>,
    Path(chemical_type): Path<String>,
) -> Json<ListEnvelope<Chemical>> {
    Json(ListEnvelope::new(state.chemicals.by_type(&chemical_type).await))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedEnvelope<Chemical>>)> {
    let name = body.get("name").and_then(Value::as_str).unwrap_or("");
    let chemical_type = body.get("type").and_then(Value::as_str).unwrap_or("");
    if name.trim().is_empty() || chemical_type.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name and type are required".to_string(),
        ));
    }

    let mut chemical: Chemical = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid chemical data: {}", e)))?;
    let id = state.chemicals.create(&chemical).await?;
    chemical.id = id.clone();
    // re-fetch so the response carries the stored timestamps
    let stored = state.chemicals.get_by_id(&id).await.unwrap_or(chemical);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope::new(
            stored,
            "Chemical created successfully",
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

    if state.chemicals.update(&id, patch).await {
        Ok(Json(MessageEnvelope::new("Chemical updated successfully")))
    } else {
        Err(ApiError::NotFound("Chemical not found".to_string()))
    }
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    if state.chemicals.delete(&id).await {
        Ok(Json(MessageEnvelope::new("Chemical deleted successfully")))
    } else {
        Err(ApiError::NotFound("Chemical not found".to_string()))
    }
}
