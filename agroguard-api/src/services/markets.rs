//! Market catalog service

use agroguard_common::models::{Market, MarketChemical};
use agroguard_common::{Error, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{decode_all, decode_one, object};
use crate::store::{collections, entity_fields, FailoverStore};

#[derive(Clone)]
pub struct MarketService {
    store: Arc<FailoverStore>,
}

impl MarketService {
    pub fn new(store: Arc<FailoverStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<Market> {
        let docs = self.store.get_all(collections::MARKETS).await;
        decode_all(collections::MARKETS, docs)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Market> {
        let doc = self.store.get_by_id(collections::MARKETS, id).await?;
        decode_one(collections::MARKETS, doc)
    }

    pub async fn create(&self, market: &Market) -> Result<String> {
        let fields = entity_fields(market)?;
        self.store
            .create(collections::MARKETS, fields)
            .await
            .ok_or_else(|| Error::Internal("failed to create market".to_string()))
    }

    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> bool {
        self.store.update(collections::MARKETS, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store.delete(collections::MARKETS, id).await
    }

    /// Markets whose location or region contains `location`
    /// (case-insensitive)
    pub async fn by_location(&self, location: &str) -> Vec<Market> {
        let needle = location.to_lowercase();
        self.get_all()
            .await
            .into_iter()
            .filter(|m| {
                m.location.to_lowercase().contains(&needle)
                    || m.region.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Price listing of one market; `None` when the market doesn't exist
    pub async fn chemicals(&self, market_id: &str) -> Option<Vec<MarketChemical>> {
        self.get_by_id(market_id).await.map(|m| m.chemicals)
    }

    /// Update price and/or availability of one listed chemical, stamping
    /// `lastUpdated` with today's date. Returns false when the market or
    /// the chemical listing is missing.
    pub async fn update_chemical(
        &self,
        market_id: &str,
        chemical_id: &str,
        price: Option<f64>,
        available: Option<bool>,
    ) -> bool {
        let Some(mut market) = self.get_by_id(market_id).await else {
            return false;
        };
        let Some(listing) = market
            .chemicals
            .iter_mut()
            .find(|c| c.chemical_id == chemical_id)
        else {
            return false;
        };

        if let Some(price) = price {
            listing.price = price;
        }
        if let Some(available) = available {
            listing.available = available;
        }
        listing.last_updated = Utc::now().format("%Y-%m-%d").to_string();

        let patch = object(json!({ "chemicals": market.chemicals }));
        self.store
            .update(collections::MARKETS, market_id, patch)
            .await
    }
}
