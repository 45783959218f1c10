//! Failover repository: primary backend with authorization-triggered fallback
//!
//! Presents one logical store while the primary may refuse operations for
//! policy reasons. Every call goes to the primary first; only a classified
//! `AuthorizationDenied` reroutes the identical call to the fallback,
//! because that refusal is structural (this caller will never succeed
//! against the primary). Any other failure (network, malformed data,
//! unknown) degrades to the operation's empty result instead: failing
//! over on transient errors would mask outages behind silently stale data.
//!
//! The repository holds no state besides diagnostic call counters and never
//! issues concurrent attempts; the two backends are consulted strictly in
//! sequence.

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::{Document, RecordStore};

/// Primary-then-fallback record repository
pub struct FailoverStore {
    primary: Arc<dyn RecordStore>,
    fallback: Arc<dyn RecordStore>,
    primary_calls: AtomicU64,
    fallback_calls: AtomicU64,
}

impl FailoverStore {
    pub fn new(primary: Arc<dyn RecordStore>, fallback: Arc<dyn RecordStore>) -> Self {
        Self {
            primary,
            fallback,
            primary_calls: AtomicU64::new(0),
            fallback_calls: AtomicU64::new(0),
        }
    }

    /// Number of operations attempted against the primary backend
    pub fn primary_calls(&self) -> u64 {
        self.primary_calls.load(Ordering::Relaxed)
    }

    /// Number of operations rerouted to the fallback backend
    pub fn fallback_calls(&self) -> u64 {
        self.fallback_calls.load(Ordering::Relaxed)
    }

    /// Record the primary refusal, or the degradation of any other error.
    /// Returns true when the call should be retried on the fallback.
    fn should_fail_over(&self, operation: &str, collection: &str, e: &agroguard_common::Error) -> bool {
        if e.is_authorization_denied() {
            warn!(
                operation,
                collection,
                primary = self.primary.name(),
                fallback = self.fallback.name(),
                "primary refused caller, retrying on fallback"
            );
            self.fallback_calls.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            warn!(
                operation,
                collection,
                backend = self.primary.name(),
                error = %e,
                "primary failed without authorization denial, returning empty result"
            );
            false
        }
    }

    fn degraded<T>(&self, operation: &str, collection: &str, e: agroguard_common::Error, empty: T) -> T {
        warn!(
            operation,
            collection,
            backend = self.fallback.name(),
            error = %e,
            "fallback failed, returning empty result"
        );
        empty
    }

    pub async fn get_all(&self, collection: &str) -> Vec<Document> {
        self.primary_calls.fetch_add(1, Ordering::Relaxed);
        match self.primary.get_all(collection).await {
            Ok(records) => records,
            Err(e) if self.should_fail_over("get_all", collection, &e) => {
                match self.fallback.get_all(collection).await {
                    Ok(records) => records,
                    Err(e) => self.degraded("get_all", collection, e, Vec::new()),
                }
            }
            Err(_) => Vec::new(),
        }
    }

    pub async fn get_by_id(&self, collection: &str, id: &str) -> Option<Document> {
        self.primary_calls.fetch_add(1, Ordering::Relaxed);
        match self.primary.get_by_id(collection, id).await {
            Ok(record) => record,
            Err(e) if self.should_fail_over("get_by_id", collection, &e) => {
                match self.fallback.get_by_id(collection, id).await {
                    Ok(record) => record,
                    Err(e) => self.degraded("get_by_id", collection, e, None),
                }
            }
            Err(_) => None,
        }
    }

    /// Returns the fresh id, or `None` when neither backend accepted the
    /// record.
    pub async fn create(&self, collection: &str, fields: Map<String, Value>) -> Option<String> {
        self.primary_calls.fetch_add(1, Ordering::Relaxed);
        match self.primary.create(collection, fields.clone()).await {
            Ok(id) => Some(id),
            Err(e) if self.should_fail_over("create", collection, &e) => {
                match self.fallback.create(collection, fields).await {
                    Ok(id) => Some(id),
                    Err(e) => self.degraded("create", collection, e, None),
                }
            }
            Err(_) => None,
        }
    }

    pub async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> bool {
        self.primary_calls.fetch_add(1, Ordering::Relaxed);
        match self.primary.update(collection, id, patch.clone()).await {
            Ok(found) => found,
            Err(e) if self.should_fail_over("update", collection, &e) => {
                match self.fallback.update(collection, id, patch).await {
                    Ok(found) => found,
                    Err(e) => self.degraded("update", collection, e, false),
                }
            }
            Err(_) => false,
        }
    }

    pub async fn delete(&self, collection: &str, id: &str) -> bool {
        self.primary_calls.fetch_add(1, Ordering::Relaxed);
        match self.primary.delete(collection, id).await {
            Ok(found) => found,
            Err(e) if self.should_fail_over("delete", collection, &e) => {
                match self.fallback.delete(collection, id).await {
                    Ok(found) => found,
                    Err(e) => self.degraded("delete", collection, e, false),
                }
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroguard_common::Error;
    use async_trait::async_trait;
    use chrono::Utc;

    /// What the fake backend should do for every operation
    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        DenyAuthorization,
        FailTransient,
    }

    /// Counting fake backend
    struct FakeStore {
        behavior: Behavior,
        calls: AtomicU64,
    }

    impl FakeStore {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicU64::new(0),
            })
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }

        fn check(&self) -> agroguard_common::Result<()> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match self.behavior {
                Behavior::Succeed => Ok(()),
                Behavior::DenyAuthorization => {
                    Err(Error::AuthorizationDenied("policy".to_string()))
                }
                Behavior::FailTransient => Err(Error::Http("connection reset".to_string())),
            }
        }

        fn sample_doc() -> Document {
            Document {
                id: "doc-1".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                fields: Map::new(),
            }
        }
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn get_all(&self, _collection: &str) -> agroguard_common::Result<Vec<Document>> {
            self.check()?;
            Ok(vec![Self::sample_doc()])
        }

        async fn get_by_id(
            &self,
            _collection: &str,
            _id: &str,
        ) -> agroguard_common::Result<Option<Document>> {
            self.check()?;
            Ok(Some(Self::sample_doc()))
        }

        async fn create(
            &self,
            _collection: &str,
            _fields: Map<String, Value>,
        ) -> agroguard_common::Result<String> {
            self.check()?;
            Ok("fresh-id".to_string())
        }

        async fn update(
            &self,
            _collection: &str,
            _id: &str,
            _patch: Map<String, Value>,
        ) -> agroguard_common::Result<bool> {
            self.check()?;
            Ok(true)
        }

        async fn delete(&self, _collection: &str, _id: &str) -> agroguard_common::Result<bool> {
            self.check()?;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn primary_success_never_touches_fallback() {
        let primary = FakeStore::new(Behavior::Succeed);
        let fallback = FakeStore::new(Behavior::Succeed);
        let store = FailoverStore::new(primary.clone(), fallback.clone());

        let all = store.get_all("diseases").await;
        assert_eq!(all.len(), 1);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
        assert_eq!(store.fallback_calls(), 0);
    }

    #[tokio::test]
    async fn authorization_denial_reroutes_to_fallback() {
        let primary = FakeStore::new(Behavior::DenyAuthorization);
        let fallback = FakeStore::new(Behavior::Succeed);
        let store = FailoverStore::new(primary.clone(), fallback.clone());

        let id = store.create("chemicals", Map::new()).await;
        assert_eq!(id.as_deref(), Some("fresh-id"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert_eq!(store.fallback_calls(), 1);
    }

    #[tokio::test]
    async fn transient_failure_degrades_without_failover() {
        let primary = FakeStore::new(Behavior::FailTransient);
        let fallback = FakeStore::new(Behavior::Succeed);
        let store = FailoverStore::new(primary.clone(), fallback.clone());

        assert!(store.get_all("markets").await.is_empty());
        assert!(store.get_by_id("markets", "m-1").await.is_none());
        assert!(store.create("markets", Map::new()).await.is_none());
        assert!(!store.update("markets", "m-1", Map::new()).await);
        assert!(!store.delete("markets", "m-1").await);

        assert_eq!(primary.calls(), 5);
        assert_eq!(fallback.calls(), 0, "fallback must never see transient failures");
    }

    #[tokio::test]
    async fn both_backends_failing_yields_empty_results() {
        let primary = FakeStore::new(Behavior::DenyAuthorization);
        let fallback = FakeStore::new(Behavior::FailTransient);
        let store = FailoverStore::new(primary.clone(), fallback.clone());

        assert!(store.get_all("comments").await.is_empty());
        assert!(!store.update("comments", "c-1", Map::new()).await);
        assert_eq!(primary.calls(), 2);
        assert_eq!(fallback.calls(), 2);
    }

    #[tokio::test]
    async fn fallback_result_matches_what_it_would_produce_directly() {
        let denied = FakeStore::new(Behavior::DenyAuthorization);
        let fallback = FakeStore::new(Behavior::Succeed);
        let store = FailoverStore::new(denied, fallback.clone());

        let via_failover = store.get_by_id("diseases", "doc-1").await.unwrap();
        let direct = fallback
            .get_by_id("diseases", "doc-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(via_failover.id, direct.id);
    }
}
