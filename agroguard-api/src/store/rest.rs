//! Fallback backend client: speaks the collection REST surface
//!
//! A [`RecordStore`] implementation over the fallback service's HTTP API
//! (`GET/POST /api/<collection>`, `GET/PUT/DELETE /api/<collection>/:id`),
//! used when the fallback runs as a separate process. Response bodies use
//! the `{success, data, count, message, error}` envelope.

use agroguard_common::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::{Document, RecordStore};

/// Default timeout for fallback service requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the fallback record service
pub struct RestStore {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[allow(dead_code)]
    success: bool,
    data: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    #[allow(dead_code)]
    success: bool,
    data: Document,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: String,
}

impl RestStore {
    /// `base_url` without a trailing slash, e.g. `http://127.0.0.1:3001`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/api/{}", self.base_url, collection)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, collection, id)
    }

    /// Map a non-success status to the closed error kinds.
    async fn classify(response: reqwest::Response) -> Error {
        let status = response.status();
        let detail = response
            .json::<ErrorEnvelope>()
            .await
            .map(|e| e.error)
            .unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthorizationDenied(detail),
            StatusCode::NOT_FOUND => Error::NotFound(detail),
            StatusCode::BAD_REQUEST => Error::InvalidInput(detail),
            _ => Error::Http(format!("fallback service returned {}: {}", status, detail)),
        }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    fn name(&self) -> &'static str {
        "rest-fallback"
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        let response = self
            .http
            .get(self.collection_url(collection))
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {}: {}", collection, e)))?;

        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }

        let envelope: ListEnvelope = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("parse {} list: {}", collection, e)))?;
        Ok(envelope.data)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let response = self
            .http
            .get(self.record_url(collection, id))
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {}/{}: {}", collection, id, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }

        let envelope: ItemEnvelope = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("parse {} record: {}", collection, e)))?;
        Ok(Some(envelope.data))
    }

    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        let response = self
            .http
            .post(self.collection_url(collection))
            .json(&Value::Object(fields))
            .send()
            .await
            .map_err(|e| Error::Http(format!("POST {}: {}", collection, e)))?;

        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }

        let envelope: ItemEnvelope = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("parse {} create: {}", collection, e)))?;
        Ok(envelope.data.id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        let response = self
            .http
            .put(self.record_url(collection, id))
            .json(&Value::Object(patch))
            .send()
            .await
            .map_err(|e| Error::Http(format!("PUT {}/{}: {}", collection, id, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let response = self
            .http
            .delete(self.record_url(collection, id))
            .send()
            .await
            .map_err(|e| Error::Http(format!("DELETE {}/{}: {}", collection, id, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let store = RestStore::new("http://localhost:3001/");
        assert_eq!(
            store.collection_url("diseases"),
            "http://localhost:3001/api/diseases"
        );
        assert_eq!(
            store.record_url("comments", "c-1"),
            "http://localhost:3001/api/comments/c-1"
        );
    }

    // Wire-level behavior (404 -> None/false, envelope parsing) is covered
    // by the integration test that points a RestStore at a live router.
}
