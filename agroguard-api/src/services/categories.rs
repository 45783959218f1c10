//! Disease category service

use agroguard_common::models::DiseaseCategory;
use agroguard_common::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{decode_all, decode_one};
use crate::store::{collections, entity_fields, FailoverStore};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<FailoverStore>,
}

impl CategoryService {
    pub fn new(store: Arc<FailoverStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<DiseaseCategory> {
        let docs = self.store.get_all(collections::DISEASE_CATEGORIES).await;
        decode_all(collections::DISEASE_CATEGORIES, docs)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<DiseaseCategory> {
        let doc = self
            .store
            .get_by_id(collections::DISEASE_CATEGORIES, id)
            .await?;
        decode_one(collections::DISEASE_CATEGORIES, doc)
    }

    pub async fn create(&self, category: &DiseaseCategory) -> Result<String> {
        let fields = entity_fields(category)?;
        self.store
            .create(collections::DISEASE_CATEGORIES, fields)
            .await
            .ok_or_else(|| Error::Internal("failed to create disease category".to_string()))
    }

    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> bool {
        self.store
            .update(collections::DISEASE_CATEGORIES, id, patch)
            .await
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store
            .delete(collections::DISEASE_CATEGORIES, id)
            .await
    }
}
