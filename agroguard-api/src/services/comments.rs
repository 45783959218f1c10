//! Comment service and the read/reply workflow

use agroguard_common::models::{Comment, CommentStatus};
use agroguard_common::{Error, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{decode_all, decode_one, object};
use crate::store::{collections, entity_fields, FailoverStore};

#[derive(Clone)]
pub struct CommentService {
    store: Arc<FailoverStore>,
}

impl CommentService {
    pub fn new(store: Arc<FailoverStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<Comment> {
        let docs = self.store.get_all(collections::COMMENTS).await;
        decode_all(collections::COMMENTS, docs)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Comment> {
        let doc = self.store.get_by_id(collections::COMMENTS, id).await?;
        decode_one(collections::COMMENTS, doc)
    }

    pub async fn create(&self, comment: &Comment) -> Result<String> {
        let fields = entity_fields(comment)?;
        self.store
            .create(collections::COMMENTS, fields)
            .await
            .ok_or_else(|| Error::Internal("failed to create comment".to_string()))
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store.delete(collections::COMMENTS, id).await
    }

    pub async fn by_status(&self, status: CommentStatus) -> Vec<Comment> {
        self.get_all()
            .await
            .into_iter()
            .filter(|c| c.status == status)
            .collect()
    }

    pub async fn by_user(&self, user_id: &str) -> Vec<Comment> {
        self.get_all()
            .await
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect()
    }

    /// Comments tagged with one category; untagged comments never match
    pub async fn by_category(&self, category: &str) -> Vec<Comment> {
        self.get_all()
            .await
            .into_iter()
            .filter(|c| c.category.as_deref() == Some(category))
            .collect()
    }

    /// Mark a comment as read, stamping `readAt`.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.transition(
            id,
            CommentStatus::Read,
            object(json!({
                "status": CommentStatus::Read,
                "readAt": Utc::now(),
            })),
        )
        .await
    }

    /// Reply to a comment. The reply text and author are set only on this
    /// transition; the author defaults to "Admin".
    pub async fn mark_replied(
        &self,
        id: &str,
        reply: String,
        replied_by: Option<String>,
    ) -> Result<()> {
        self.transition(
            id,
            CommentStatus::Replied,
            object(json!({
                "status": CommentStatus::Replied,
                "reply": reply,
                "repliedBy": replied_by.unwrap_or_else(|| "Admin".to_string()),
                "repliedAt": Utc::now(),
            })),
        )
        .await
    }

    /// Apply a status transition after validating it is monotonic.
    async fn transition(
        &self,
        id: &str,
        next: CommentStatus,
        patch: Map<String, Value>,
    ) -> Result<()> {
        let comment = self
            .get_by_id(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("comment {}", id)))?;

        if !comment.status.can_transition_to(next) {
            return Err(Error::InvalidInput(format!(
                "comment status cannot move from {:?} to {:?}",
                comment.status, next
            )));
        }

        if self.store.update(collections::COMMENTS, id, patch).await {
            Ok(())
        } else {
            Err(Error::Internal("failed to update comment".to_string()))
        }
    }
}
