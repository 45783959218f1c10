//! Market catalog and price listing endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use agroguard_common::models::{Market, MarketChemical};

use super::{CreatedEnvelope, ItemEnvelope, ListEnvelope, MessageEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all).post(create))
        .route("/location/:location", get(by_location))
        .route("/:id", get(get_by_id).put(update).delete(delete))
        .route("/:id/chemicals", get(chemicals))
        .route("/:id/chemicals/:chemical_id", put(update_chemical))
}

async fn get_all(State(state): State<AppState>) -> Json<ListEnvelope<Market>> {
    Json(ListEnvelope::new(state.markets.get_all().await))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemEnvelope<Market>>> {
    let market = state
        .markets
        .get_by_id(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Market not found".to_string()))?;
    Ok(Json(ItemEnvelope::new(market)))
}

async fn by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<ListEnvelope<Market>> {
    Json(ListEnvelope::new(state.markets.by_location(&location).await))
}

async fn chemicals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ListEnvelope<MarketChemical>>> {
    let listing = state
        .markets
        .chemicals(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Market not found".to_string()))?;
    Ok(Json(ListEnvelope::new(listing)))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedEnvelope<Market>>)> {
    let name = body.get("name").and_then(Value::as_str).unwrap_or("");
    let location = body.get("location").and_then(Value::as_str).unwrap_or("");
    if name.trim().is_empty() || location.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name and location are required".to_string(),
        ));
    }

    let mut market: Market = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid market data: {}", e)))?;
    let id = state.markets.create(&market).await?;
    market.id = id.clone();
    // re-fetch so the response carries the stored timestamps
    let stored = state.markets.get_by_id(&id).await.unwrap_or(market);

    Ok((
        StatusCode::CREATED,
        Json(CreatedEnvelope::new(stored, "Market created successfully")),
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

    if state.markets.update(&id, patch).await {
        Ok(Json(MessageEnvelope::new("Market updated successfully")))
    } else {
        Err(ApiError::NotFound("Market not found".to_string()))
    }
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    if state.markets.delete(&id).await {
        Ok(Json(MessageEnvelope::new("Market deleted successfully")))
    } else {
        Err(ApiError::NotFound("Market not found".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ChemicalPatch {
    price: Option<f64>,
    available: Option<bool>,
}

async fn update_chemical(
    State(state): State<AppState>,
    Path((id, chemical_id)): Path<(String, String)>,
    Json(patch): Json<ChemicalPatch>,
) -> ApiResult<Json<MessageEnvelope>> {
    if patch.price.is_none() && patch.available.is_none() {
        return Err(ApiError::BadRequest(
            "Price or availability is required".to_string(),
        ));
    }

    if state
        .markets
        .update_chemical(&id, &chemical_id, patch.price, patch.available)
        .await
    {
        Ok(Json(MessageEnvelope::new(
            "Chemical price updated successfully",
        )))
    } else {
        Err(ApiError::NotFound(
            "Market or chemical not found".to_string(),
        ))
    }
}
