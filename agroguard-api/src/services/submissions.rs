//! Pending submission service and the review workflow
//!
//! Approving a submission is a two-step workflow: create the Disease, then
//! stamp the submission. The two writes are not transactional across
//! stores; a failure between them can leave a submission `pending` with an
//! already-created disease, which the admin re-running approve resolves
//! (at-least-once semantics).

use agroguard_common::models::{
    Disease, LocalizedList, LocalizedText, PendingSubmission, SubmissionStatus,
};
use agroguard_common::{Error, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{decode_all, decode_one, object};
use crate::store::{collections, entity_fields, FailoverStore};

#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<FailoverStore>,
}

impl SubmissionService {
    pub fn new(store: Arc<FailoverStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<PendingSubmission> {
        let docs = self.store.get_all(collections::PENDING_SUBMISSIONS).await;
        decode_all(collections::PENDING_SUBMISSIONS, docs)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<PendingSubmission> {
        let doc = self
            .store
            .get_by_id(collections::PENDING_SUBMISSIONS, id)
            .await?;
        decode_one(collections::PENDING_SUBMISSIONS, doc)
    }

    pub async fn create(&self, submission: &PendingSubmission) -> Result<String> {
        let fields = entity_fields(submission)?;
        self.store
            .create(collections::PENDING_SUBMISSIONS, fields)
            .await
            .ok_or_else(|| Error::Internal("failed to submit disease for review".to_string()))
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store
            .delete(collections::PENDING_SUBMISSIONS, id)
            .await
    }

    pub async fn by_status(&self, status: SubmissionStatus) -> Vec<PendingSubmission> {
        self.get_all()
            .await
            .into_iter()
            .filter(|s| s.status == status)
            .collect()
    }

    /// Approve a pending submission: create a Disease (from the provided
    /// data, or derived from the submission itself) and stamp the
    /// submission `approved` with the new disease id. Returns the new
    /// disease id.
    pub async fn approve(&self, id: &str, disease: Option<Disease>) -> Result<String> {
        let submission = self
            .get_by_id(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("pending submission {}", id)))?;

        if submission.status.is_terminal() {
            return Err(Error::InvalidInput(
                "Disease has already been processed".to_string(),
            ));
        }

        let disease = disease.unwrap_or_else(|| derive_disease(&submission));
        let disease_fields = entity_fields(&disease)?;
        let disease_id = self
            .store
            .create(collections::DISEASES, disease_fields)
            .await
            .ok_or_else(|| Error::Internal("failed to create disease".to_string()))?;

        let patch = object(json!({
            "status": SubmissionStatus::Approved,
            "approvedAt": Utc::now(),
            "approvedDiseaseId": disease_id,
        }));
        let stamped = self
            .store
            .update(collections::PENDING_SUBMISSIONS, id, patch)
            .await;
        if !stamped {
            // the disease exists either way; re-running approve is safe
            warn!(
                submission = id,
                disease = %disease_id,
                "disease created but submission stamp failed"
            );
        }

        info!(submission = id, disease = %disease_id, "submission approved");
        Ok(disease_id)
    }

    /// Reject a pending submission with an optional reason.
    pub async fn reject(&self, id: &str, reason: Option<String>) -> Result<()> {
        let submission = self
            .get_by_id(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("pending submission {}", id)))?;

        if submission.status.is_terminal() {
            return Err(Error::InvalidInput(
                "Disease has already been processed".to_string(),
            ));
        }

        let patch = object(json!({
            "status": SubmissionStatus::Rejected,
            "rejectedAt": Utc::now(),
            "rejectionReason": reason.unwrap_or_else(|| "No reason provided".to_string()),
        }));
        let stamped = self
            .store
            .update(collections::PENDING_SUBMISSIONS, id, patch)
            .await;
        if !stamped {
            return Err(Error::Internal("failed to reject submission".to_string()));
        }

        info!(submission = id, "submission rejected");
        Ok(())
    }

    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> bool {
        self.store
            .update(collections::PENDING_SUBMISSIONS, id, patch)
            .await
    }
}

/// Default disease derived from a submission when the admin provides none
fn derive_disease(submission: &PendingSubmission) -> Disease {
    Disease {
        id: String::new(),
        name: LocalizedText::english(format!("{} Disease", submission.crop_type)),
        crop_type: submission.crop_type.clone(),
        category_id: None,
        featured: false,
        images: submission.images.clone(),
        symptoms: LocalizedList {
            en: submission.symptoms.clone(),
            ..Default::default()
        },
        treatments: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}
