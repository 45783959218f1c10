//! Chemical catalog service

use agroguard_common::models::Chemical;
use agroguard_common::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{decode_all, decode_one};
use crate::store::{collections, entity_fields, FailoverStore};

#[derive(Clone)]
pub struct ChemicalService {
    store: Arc<FailoverStore>,
}

impl ChemicalService {
    pub fn new(store: Arc<FailoverStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<Chemical> {
        let docs = self.store.get_all(collections::CHEMICALS).await;
        decode_all(collections::CHEMICALS, docs)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Chemical> {
        let doc = self.store.get_by_id(collections::CHEMICALS, id).await?;
        decode_one(collections::CHEMICALS, doc)
    }

    pub async fn create(&self, chemical: &Chemical) -> Result<String> {
        let fields = entity_fields(chemical)?;
        self.store
            .create(collections::CHEMICALS, fields)
            .await
            .ok_or_else(|| Error::Internal("failed to create chemical".to_string()))
    }

    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> bool {
        self.store.update(collections::CHEMICALS, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store.delete(collections::CHEMICALS, id).await
    }

    /// Chemicals of one class, matched case-insensitively
    pub async fn by_type(&self, chemical_type: &str) -> Vec<Chemical> {
        let needle = chemical_type.to_lowercase();
        self.get_all()
            .await
            .into_iter()
            .filter(|c| c.chemical_type.to_lowercase() == needle)
            .collect()
    }
}
