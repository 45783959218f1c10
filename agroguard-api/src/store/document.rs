//! Primary backend: SQLite-backed document store
//!
//! Records live in a single `documents` table keyed by (collection, id)
//! with the entity fields as a JSON body. An `access_policy` table plays
//! the role of the managed database's security rules: a collection can be
//! closed for reads and/or writes, in which case operations fail with
//! `Error::AuthorizationDenied` and the failover repository takes over.

use agroguard_common::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

use super::{Document, RecordStore};

/// SQLite-backed document store
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Open (or create) the database at `db_path` and initialize tables.
    pub async fn connect(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // SQLite URI with mode=rwc (read, write, create)
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        tracing::debug!("Connecting to database: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool (used by tests with `:memory:`).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        init_tables(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set the access policy for one collection. Collections without a
    /// policy row allow everything.
    pub async fn set_policy(
        &self,
        collection: &str,
        allow_read: bool,
        allow_write: bool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO access_policy (collection, allow_read, allow_write) VALUES (?, ?, ?)
             ON CONFLICT(collection) DO UPDATE SET
                 allow_read = excluded.allow_read,
                 allow_write = excluded.allow_write",
        )
        .bind(collection)
        .bind(allow_read as i64)
        .bind(allow_write as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Enforce the collection policy for the requested operation kind.
    async fn check_access(&self, collection: &str, write: bool) -> Result<()> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT allow_read, allow_write FROM access_policy WHERE collection = ?",
        )
        .bind(collection)
        .fetch_optional(&self.pool)
        .await?;

        let allowed = match row {
            Some((allow_read, allow_write)) => {
                if write {
                    allow_write != 0
                } else {
                    allow_read != 0
                }
            }
            None => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(Error::AuthorizationDenied(format!(
                "{} access to '{}' refused by policy",
                if write { "write" } else { "read" },
                collection
            )))
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("malformed timestamp '{}': {}", raw, e)))
}

fn row_to_document(id: String, created_at: String, updated_at: String, body: String) -> Result<Document> {
    let fields: Map<String, Value> = serde_json::from_str(&body)
        .map_err(|e| Error::Internal(format!("malformed document body: {}", e)))?;
    Ok(Document {
        id,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        fields,
    })
}

#[async_trait]
impl RecordStore for DocumentStore {
    fn name(&self) -> &'static str {
        "document-db"
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.check_access(collection, false).await?;

        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, created_at, updated_at, body FROM documents WHERE collection = ?",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, c, u, body)| row_to_document(id, c, u, body))
            .collect()
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.check_access(collection, false).await?;

        let row: Option<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, created_at, updated_at, body FROM documents
             WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, c, u, body)| row_to_document(id, c, u, body))
            .transpose()
    }

    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        self.check_access(collection, true).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let body = serde_json::to_string(&fields)
            .map_err(|e| Error::Internal(format!("serialize document body: {}", e)))?;

        sqlx::query(
            "INSERT INTO documents (collection, id, created_at, updated_at, body)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&id)
        .bind(&now)
        .bind(&now)
        .bind(&body)
        .execute(&self.pool)
        .await?;

        tracing::debug!(collection, id = %id, "created document");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        self.check_access(collection, true).await?;

        let Some(mut doc) = self.get_by_id(collection, id).await? else {
            return Ok(false);
        };
        doc.apply_patch(patch);

        let body = serde_json::to_string(&doc.fields)
            .map_err(|e| Error::Internal(format!("serialize document body: {}", e)))?;

        let result = sqlx::query(
            "UPDATE documents SET updated_at = ?, body = ? WHERE collection = ? AND id = ?",
        )
        .bind(doc.updated_at.to_rfc3339())
        .bind(&body)
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.check_access(collection, true).await?;

        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Create the document and policy tables if they don't exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS access_policy (
            collection TEXT PRIMARY KEY,
            allow_read INTEGER NOT NULL DEFAULT 1,
            allow_write INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collections;

    async fn memory_store() -> DocumentStore {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        DocumentStore::from_pool(pool).await.unwrap()
    }

    fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[tokio::test]
    async fn create_then_get_by_id_has_equal_timestamps() {
        let store = memory_store().await;
        let id = store
            .create(collections::CHEMICALS, fields(&[("name", "X"), ("type", "Fungicide")]))
            .await
            .unwrap();

        let doc = store
            .get_by_id(collections::CHEMICALS, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(doc.fields.get("name").unwrap(), "X");
        assert_eq!(doc.fields.get("type").unwrap(), "Fungicide");
    }

    #[tokio::test]
    async fn update_merges_and_bumps_updated_at() {
        let store = memory_store().await;
        let id = store
            .create(collections::CHEMICALS, fields(&[("name", "X"), ("type", "Fungicide")]))
            .await
            .unwrap();
        let before = store
            .get_by_id(collections::CHEMICALS, &id)
            .await
            .unwrap()
            .unwrap();

        // make sure the bump is observable
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = store
            .update(collections::CHEMICALS, &id, fields(&[("dosage", "2 kg/ha")]))
            .await
            .unwrap();
        assert!(updated);

        let after = store
            .get_by_id(collections::CHEMICALS, &id)
            .await
            .unwrap()
            .unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.fields.get("name").unwrap(), "X");
        assert_eq!(after.fields.get("dosage").unwrap(), "2 kg/ha");
    }

    #[tokio::test]
    async fn delete_then_get_returns_none() {
        let store = memory_store().await;
        let id = store
            .create(collections::MARKETS, fields(&[("name", "Adama")]))
            .await
            .unwrap();

        assert!(store.delete(collections::MARKETS, &id).await.unwrap());
        assert!(store
            .get_by_id(collections::MARKETS, &id)
            .await
            .unwrap()
            .is_none());
        // delete on a missing id reports false, never an error
        assert!(!store.delete(collections::MARKETS, &id).await.unwrap());
    }

    #[tokio::test]
    async fn policy_denial_surfaces_as_authorization_denied() {
        let store = memory_store().await;
        store
            .set_policy(collections::DISEASES, true, false)
            .await
            .unwrap();

        // reads still allowed
        assert!(store.get_all(collections::DISEASES).await.is_ok());

        let err = store
            .create(collections::DISEASES, fields(&[("cropType", "Maize")]))
            .await
            .unwrap_err();
        assert!(err.is_authorization_denied());

        // full lockout blocks reads too
        store
            .set_policy(collections::DISEASES, false, false)
            .await
            .unwrap();
        let err = store.get_all(collections::DISEASES).await.unwrap_err();
        assert!(err.is_authorization_denied());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = memory_store().await;
        store
            .create(collections::CHEMICALS, fields(&[("name", "A")]))
            .await
            .unwrap();

        assert!(store.get_all(collections::MARKETS).await.unwrap().is_empty());
        assert_eq!(store.get_all(collections::CHEMICALS).await.unwrap().len(), 1);
    }
}
