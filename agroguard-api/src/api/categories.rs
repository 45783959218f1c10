//! Disease category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use agroguard_common::models::{Disease, DiseaseCategory};

use super::{CreatedEnvelope, ItemEnvelope, ListEnvelope, MessageEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/:id", get(get_by_id).put(update).delete(delete))
        .route("/:id/diseases", get(diseases))
}

async fn get_all(State(state): State<AppState>) -> Json<ListEnvelope<DiseaseCategory>> {
    Json(ListEnvelope::new(state.categories.get_all().await))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemEnvelope<DiseaseCategory>>> {
    let category = state
        .categories
        .get_by_id(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(Json(ItemEnvelope::new(category)))
}

async fn diseases(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ListEnvelope<Disease>>> {
    if state.categories.get_by_id(&id).await.is_none() {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }
    Ok(Json(ListEnvelope::new(state.diseases.by_category(&id).await)))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedEnvelope<DiseaseCategory>>)> {
    let name_en = body
        .pointer("/name/en")
        .and_then(Value::as_str)
        .unwrap_or("");
    if name_en.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Category name (English) is required".to_string(),
        ));
    }

    let mut category: DiseaseCategory = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid category data: {}", e)))?;
    let id = state.categories.create(&category).await?;
    category.id = id.clone();
    // re-fetch so the response carries the stored timestamps
    let stored = state.categories.get_by_id(&id).await.unwrap_or(category);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope::new(
            stored,
            "Category created successfully",
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

    if state.categories.update(&id, patch).await {
        Ok(Json(MessageEnvelope::new("Category updated successfully")))
    } else {
        Err(ApiError::NotFound("Category not found".to_string()))
    }
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    if state.categories.delete(&id).await {
        Ok(Json(MessageEnvelope::new("Category deleted successfully")))
    } else {
        Err(ApiError::NotFound("Category not found".to_string()))
    }
}
