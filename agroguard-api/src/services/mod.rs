//! Catalog services: typed façades over the failover repository
//!
//! Each service wraps one collection, (de)serializing entities through the
//! generic [`Document`](crate::store::Document) shape and adding domain
//! filters and the multi-step review/reply workflows. Filters run
//! client-side over `get_all`, which is acceptable at current catalog
//! sizes. Records that no longer deserialize are skipped with a warning
//! rather than failing the whole read.

pub mod categories;
pub mod chemicals;
pub mod comments;
pub mod diseases;
pub mod markets;
pub mod submissions;

pub use categories::CategoryService;
pub use chemicals::ChemicalService;
pub use comments::CommentService;
pub use diseases::DiseaseService;
pub use markets::MarketService;
pub use submissions::SubmissionService;

use crate::store::Document;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Decode a batch of documents, dropping malformed records
pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| decode_one(collection, doc))
        .collect()
}

/// Decode one document, logging and dropping it when malformed
pub(crate) fn decode_one<T: DeserializeOwned>(collection: &str, doc: Document) -> Option<T> {
    match doc.to_entity() {
        Ok(entity) => Some(entity),
        Err(e) => {
            warn!(collection, id = %doc.id, error = %e, "skipping malformed record");
            None
        }
    }
}

/// Unwrap a `json!` object literal into a patch map
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
