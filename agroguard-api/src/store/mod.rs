//! Record persistence for the catalog
//!
//! Every catalog entity is stored as a keyed record (a [`Document`]) in one
//! of two interchangeable backends implementing [`RecordStore`]:
//!
//! - [`DocumentStore`]: the primary backend, a document table in SQLite
//!   guarded by a per-collection access policy
//! - [`FileStore`]: one JSON array file per collection, backing the
//!   fallback REST service
//! - [`RestStore`]: a client for a remote fallback REST service
//!
//! [`FailoverStore`] composes a primary and a fallback backend and is what
//! the catalog services actually talk to.

pub mod document;
pub mod failover;
pub mod file;
pub mod rest;

pub use document::DocumentStore;
pub use failover::FailoverStore;
pub use file::FileStore;
pub use rest::RestStore;

use agroguard_common::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection names served by both backends
pub mod collections {
    pub const DISEASES: &str = "diseases";
    pub const DISEASE_CATEGORIES: &str = "disease-categories";
    pub const CHEMICALS: &str = "chemicals";
    pub const MARKETS: &str = "markets";
    pub const PENDING_SUBMISSIONS: &str = "pending-diseases";
    pub const COMMENTS: &str = "comments";

    pub const ALL: [&str; 6] = [
        DISEASES,
        DISEASE_CATEGORIES,
        CHEMICALS,
        MARKETS,
        PENDING_SUBMISSIONS,
        COMMENTS,
    ];
}

/// A persisted keyed record: identity, store-managed timestamps, and the
/// entity fields as free-form JSON. Serializes flat, so the wire shape is
/// `{id, createdAt, updatedAt, ...fields}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Merge a partial update into the fields and bump `updated_at`.
    /// `id` and `created_at` are never touched.
    pub fn apply_patch(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if key == "id" || key == "createdAt" {
                continue;
            }
            self.fields.insert(key, value);
        }
        self.updated_at = Utc::now();
    }

    /// Deserialize the whole record (identity, timestamps and fields) into
    /// a typed entity.
    pub fn to_entity<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

/// Extract the storable fields of an entity: serialize it and strip the
/// store-managed keys so backends stay the single source of truth for them.
pub fn entity_fields<T: Serialize>(entity: &T) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(entity)
        .map_err(|e| agroguard_common::Error::Internal(format!("serialize entity: {}", e)))?;
    let mut fields = match value {
        Value::Object(map) => map,
        other => {
            return Err(agroguard_common::Error::Internal(format!(
                "entity must serialize to an object, got {}",
                other
            )))
        }
    };
    fields.remove("id");
    fields.remove("createdAt");
    fields.remove("updatedAt");
    Ok(fields)
}

/// Data persistence contract shared by the primary and fallback backends.
///
/// Each call is atomic at single-record granularity; there are no
/// multi-record transactions. `get_all` makes no ordering guarantee.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>>;

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a fresh record with a generated id and
    /// `created_at == updated_at == now`; returns the new id.
    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String>;

    /// Merge `patch` into the record's fields and bump `updated_at`.
    /// Returns false when the id does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool>;

    /// Returns false when the id does not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_flat() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String("Mancozeb".to_string()));
        let doc = Document {
            id: "c-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            fields,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], "c-1");
        assert_eq!(value["name"], "Mancozeb");
        assert!(value.get("fields").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn apply_patch_never_touches_identity() {
        let created = Utc::now() - chrono::Duration::seconds(60);
        let mut doc = Document {
            id: "m-1".to_string(),
            created_at: created,
            updated_at: created,
            fields: Map::new(),
        };
        let mut patch = Map::new();
        patch.insert("id".to_string(), Value::String("hijack".to_string()));
        patch.insert("createdAt".to_string(), Value::String("1970-01-01".to_string()));
        patch.insert("region".to_string(), Value::String("Oromia".to_string()));
        doc.apply_patch(patch);

        assert_eq!(doc.id, "m-1");
        assert_eq!(doc.created_at, created);
        assert!(doc.updated_at > created);
        assert_eq!(doc.fields.get("region").unwrap(), "Oromia");
        assert!(doc.fields.get("id").is_none());
    }

    #[test]
    fn entity_fields_strips_store_managed_keys() {
        let chem = agroguard_common::models::Chemical {
            id: "c-9".to_string(),
            name: "Neem oil".to_string(),
            chemical_type: "Organic".to_string(),
            active_ingredient: String::new(),
            dosage: String::new(),
            safety_instructions: Default::default(),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        let fields = entity_fields(&chem).unwrap();
        assert!(fields.get("id").is_none());
        assert!(fields.get("createdAt").is_none());
        assert_eq!(fields.get("name").unwrap(), "Neem oil");
    }
}
