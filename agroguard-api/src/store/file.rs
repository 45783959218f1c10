//! Fallback backing store: one JSON array file per collection
//!
//! This is the store behind the fallback REST surface. Each collection is
//! a single JSON array of records; writes rewrite the whole file under a
//! store-wide mutex, which gives single-record atomicity from the caller's
//! point of view. A missing file reads as an empty collection.

use agroguard_common::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{collections, Document, RecordStore};

/// JSON-file-backed record store
pub struct FileStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles across collections
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory and empty
    /// collection files as needed.
    pub async fn open(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        for collection in collections::ALL {
            let path = dir.join(format!("{}.json", collection));
            if !path.exists() {
                tokio::fs::write(&path, "[]").await?;
                tracing::debug!(collection, "initialized collection file");
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    async fn read(&self, collection: &str) -> Result<Vec<Document>> {
        let path = self.path(collection);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw)
            .map_err(|e| Error::Internal(format!("malformed collection file {}: {}", collection, e)))
    }

    async fn write(&self, collection: &str, records: &[Document]) -> Result<()> {
        let body = serde_json::to_string_pretty(records)
            .map_err(|e| Error::Internal(format!("serialize collection {}: {}", collection, e)))?;
        tokio::fs::write(self.path(collection), body).await?;
        Ok(())
    }
}

/// Compact time-plus-random id, like the original file store used
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", to_base36(millis), &suffix[..8])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

#[async_trait]
impl RecordStore for FileStore {
    fn name(&self) -> &'static str {
        "file-store"
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.read(collection).await
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let records = self.read(collection).await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read(collection).await?;
        let now = Utc::now();
        let doc = Document {
            id: generate_id(),
            created_at: now,
            updated_at: now,
            fields,
        };
        let id = doc.id.clone();
        records.push(doc);
        self.write(collection, &records).await?;

        tracing::debug!(collection, id = %id, "created record");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read(collection).await?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        record.apply_patch(patch);
        self.write(collection, &records).await?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read(collection).await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write(collection, &records).await?;
        Ok(true)
    }
}
