//! Disease catalog service

use agroguard_common::models::Disease;
use agroguard_common::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{decode_all, decode_one};
use crate::store::{collections, entity_fields, FailoverStore};

#[derive(Clone)]
pub struct DiseaseService {
    store: Arc<FailoverStore>,
}

impl DiseaseService {
    pub fn new(store: Arc<FailoverStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<Disease> {
        let docs = self.store.get_all(collections::DISEASES).await;
        decode_all(collections::DISEASES, docs)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Disease> {
        let doc = self.store.get_by_id(collections::DISEASES, id).await?;
        decode_one(collections::DISEASES, doc)
    }

    pub async fn create(&self, disease: &Disease) -> Result<String> {
        let fields = entity_fields(disease)?;
        self.store
            .create(collections::DISEASES, fields)
            .await
            .ok_or_else(|| Error::Internal("failed to create disease".to_string()))
    }

    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> bool {
        self.store.update(collections::DISEASES, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store.delete(collections::DISEASES, id).await
    }

    /// Diseases whose crop type contains `crop` (case-insensitive)
    pub async fn search_by_crop(&self, crop: &str) -> Vec<Disease> {
        let needle = crop.to_lowercase();
        self.get_all()
            .await
            .into_iter()
            .filter(|d| d.crop_type.to_lowercase().contains(&needle))
            .collect()
    }

    /// Diseases assigned to one category; uncategorized diseases never match
    pub async fn by_category(&self, category_id: &str) -> Vec<Disease> {
        self.get_all()
            .await
            .into_iter()
            .filter(|d| d.category_id.as_deref() == Some(category_id))
            .collect()
    }

    /// Diseases highlighted on the home page
    pub async fn featured(&self) -> Vec<Disease> {
        self.get_all()
            .await
            .into_iter()
            .filter(|d| d.featured)
            .collect()
    }
}
