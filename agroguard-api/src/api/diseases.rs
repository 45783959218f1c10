//! Disease catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use agroguard_common::models::Disease;

use super::{CreatedEnvelope, ItemEnvelope, ListEnvelope, MessageEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/featured", get(featured))
        .route("/crop/:crop", get(by_crop))
        .route("/:id", get(get_by_id).put(update).delete(delete))
}

async fn get_all(State(state): State<AppState>) -> Json<ListEnvelope<Disease>> {
    Json(ListEnvelope::new(state.diseases.get_all().await))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemEnvelope<Disease>>> {
    let disease = state
        .diseases
        .get_by_id(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Disease not found".to_string()))?;
    Ok(Json(ItemEnvelope::new(disease)))
}

async fn by_crop(
    State(state): State<AppState>,
    Path(crop): Path<String>,
) -> Json<ListEnvelope<Disease>> {
    Json(ListEnvelope::new(state.diseases.search_by_crop(&crop).await))
}

async fn featured(State(state): State<AppState>) -> Json<ListEnvelope<Disease>> {
    Json(ListEnvelope::new(state.diseases.featured().await))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedEnvelope<Disease>>)> {
    let name_en = body
        .pointer("/name/en")
        .and_then(Value::as_str)
        .unwrap_or("");
    let crop_type = body.get("cropType").and_then(Value::as_str).unwrap_or("");
    if name_en.trim().is_empty() || crop_type.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name (English) and crop type are required".to_string(),
        ));
    }

    let mut disease: Disease = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid disease data: {}", e)))?;
    let id = state.diseases.create(&disease).await?;
    disease.id = id.clone();
    // re-fetch so the response carries the stored timestamps
    let stored = state.diseases.get_by_id(&id).await.unwrap_or(disease);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope::new(
            stored,
            "Disease created successfully",
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

    if state.diseases.update(&id, patch).await {
        Ok(Json(MessageEnvelope::new("Disease updated successfully")))
    } else {
        Err(ApiError::NotFound("Disease not found".to_string()))
    }
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    if state.diseases.delete(&id).await {
        Ok(Json(MessageEnvelope::new("Disease deleted successfully")))
    } else {
        Err(ApiError::NotFound("Disease not found".to_string()))
    }
}
