//! Wire-level tests: a RestStore client pointed at a live service
//!
//! Spawns the full router on an ephemeral port and drives it through
//! [`RestStore`], proving the client and the HTTP surface agree on the
//! envelope, and that a [`FailoverStore`] can use a remote fallback
//! service end to end.

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::sync::Arc;

use agroguard_api::analysis::{Orchestrator, SimulatedProvider};
use agroguard_api::store::{DocumentStore, FailoverStore, FileStore, RecordStore, RestStore};
use agroguard_api::{build_router, AppState};

/// Spawn a fully-wired service on an ephemeral port, returning its base URL
async fn spawn_service() -> String {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    let primary = DocumentStore::from_pool(pool).await.unwrap();

    let data = tempfile::tempdir().unwrap();
    let fallback = FileStore::open(data.path()).await.unwrap();

    let store = Arc::new(FailoverStore::new(
        Arc::new(primary),
        Arc::new(fallback),
    ));
    let orchestrator = Arc::new(Orchestrator::new(
        None,
        Arc::new(SimulatedProvider::new().without_latency()),
        false,
    ));
    let app = build_router(AppState::new(store, orchestrator));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // keep the temp dir alive for the lifetime of the service
        let _data = data;
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[tokio::test]
async fn rest_store_round_trip_against_live_service() {
    let base_url = spawn_service().await;
    let store = RestStore::new(base_url);

    // create
    let id = store
        .create("chemicals", fields(&[("name", "Mancozeb"), ("type", "Fungicide")]))
        .await
        .unwrap();
    assert!(!id.is_empty());

    // read back
    let doc = store.get_by_id("chemicals", &id).await.unwrap().unwrap();
    assert_eq!(doc.id, id);
    assert_eq!(doc.fields.get("name").unwrap(), "Mancozeb");

    let all = store.get_all("chemicals").await.unwrap();
    assert_eq!(all.len(), 1);

    // update
    let updated = store
        .update("chemicals", &id, fields(&[("dosage", "2 kg/ha")]))
        .await
        .unwrap();
    assert!(updated);
    let doc = store.get_by_id("chemicals", &id).await.unwrap().unwrap();
    assert_eq!(doc.fields.get("dosage").unwrap(), "2 kg/ha");
    assert!(doc.updated_at >= doc.created_at);

    // delete
    assert!(store.delete("chemicals", &id).await.unwrap());
    assert!(store.get_by_id("chemicals", &id).await.unwrap().is_none());
}

#[tokio::test]
async fn rest_store_maps_missing_records_to_none_and_false() {
    let base_url = spawn_service().await;
    let store = RestStore::new(base_url);

    assert!(store
        .get_by_id("chemicals", "no-such-id")
        .await
        .unwrap()
        .is_none());
    assert!(!store
        .update("chemicals", "no-such-id", fields(&[("dosage", "x")]))
        .await
        .unwrap());
    assert!(!store.delete("chemicals", "no-such-id").await.unwrap());
}

#[tokio::test]
async fn rest_store_surfaces_validation_as_invalid_input() {
    let base_url = spawn_service().await;
    let store = RestStore::new(base_url);

    // missing required "type" field
    let err = store
        .create("chemicals", fields(&[("name", "Mancozeb")]))
        .await
        .unwrap_err();
    assert!(matches!(err, agroguard_common::Error::InvalidInput(_)));
}

#[tokio::test]
async fn failover_store_reroutes_to_remote_fallback_service() {
    // local primary that refuses writes to the comments collection
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    let primary = DocumentStore::from_pool(pool).await.unwrap();
    primary.set_policy("comments", true, false).await.unwrap();

    let base_url = spawn_service().await;
    let failover = FailoverStore::new(
        Arc::new(primary.clone()),
        Arc::new(RestStore::new(base_url)),
    );

    // the refused write lands on the remote fallback service
    let id = failover
        .create(
            "comments",
            fields(&[("userId", "u-1"), ("message", "is neem oil safe?")]),
        )
        .await
        .unwrap();
    assert_eq!(failover.fallback_calls(), 1);

    // the primary never stored it
    assert!(primary
        .get_by_id("comments", &id)
        .await
        .unwrap()
        .is_none());

    // reads are still allowed on the primary, which is empty
    assert!(failover.get_all("comments").await.is_empty());
}
