//! Domain models for the AgroGuard catalog and analysis results
//!
//! Wire names are camelCase to match the REST surface and the stored
//! document shape. Catalog text is localized in three locales: English
//! (`en`), Afaan Oromo (`om`) and Amharic (`am`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One string per supported locale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub om: String,
    #[serde(default)]
    pub am: String,
}

impl LocalizedText {
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            en: text.into(),
            ..Default::default()
        }
    }
}

/// One string list per supported locale (e.g. symptom lists)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedList {
    #[serde(default)]
    pub en: Vec<String>,
    #[serde(default)]
    pub om: Vec<String>,
    #[serde(default)]
    pub am: Vec<String>,
}

/// A crop disease in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    #[serde(default)]
    pub id: String,
    pub name: LocalizedText,
    pub crop_type: String,
    /// Reference to a [`DiseaseCategory`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Highlighted in the "Common Diseases" section when set
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub symptoms: LocalizedList,
    /// Ordered treatment recommendations
    #[serde(default)]
    pub treatments: Vec<Treatment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A chemical treatment attached to a disease
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub chemical_id: String,
    #[serde(default)]
    pub chemical_name: String,
    pub dosage: String,
    #[serde(default)]
    pub safety_instructions: LocalizedText,
}

/// An agricultural chemical in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chemical {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Chemical class, e.g. "Fungicide", "Insecticide"
    #[serde(rename = "type")]
    pub chemical_type: String,
    #[serde(default)]
    pub active_ingredient: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub safety_instructions: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A market selling chemicals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub region: String,
    /// Ordered chemical price listing
    #[serde(default)]
    pub chemicals: Vec<MarketChemical>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Price and availability of one chemical at one market
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketChemical {
    pub chemical_id: String,
    #[serde(default)]
    pub chemical_name: String,
    pub price: f64,
    pub available: bool,
    /// Date stamp (`YYYY-MM-DD`) of the last price/availability edit
    #[serde(default)]
    pub last_updated: String,
}

/// A disease grouping for browsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseCategory {
    #[serde(default)]
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Hex color for UI display
    #[serde(default)]
    pub color: String,
    /// Icon token for UI display
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Review status of a user-submitted disease report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// `approved` and `rejected` are terminal
    pub fn is_terminal(self) -> bool {
        self != SubmissionStatus::Pending
    }
}

/// A user-submitted disease report awaiting admin review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmission {
    #[serde(default)]
    pub id: String,
    pub submitted_by: String,
    #[serde(default)]
    pub submitter_name: String,
    pub crop_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Disease name guessed by the analysis layer, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_disease: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Set on the `approved` transition, along with the new disease id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_disease_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lifecycle of a user comment; transitions are monotonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Unread,
    Read,
    Replied,
}

impl CommentStatus {
    /// Valid forward transitions: unread→read, unread→replied, read→replied.
    /// `replied` is terminal and nothing moves backwards.
    pub fn can_transition_to(self, next: CommentStatus) -> bool {
        use CommentStatus::*;
        matches!(
            (self, next),
            (Unread, Read) | (Unread, Replied) | (Read, Replied)
        )
    }
}

/// A user comment or question addressed to the admins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional reference to the disease/chemical/market the comment is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    pub status: CommentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Reply text and author, set only on the `replied` transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Severity of a detected disease
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

/// Structured verdict produced by an analysis provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub detected: bool,
    pub disease_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_name_amharic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_name_oromifa: Option<String>,
    /// Percent confidence, 0..=100
    pub confidence: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub treatment: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub affected_crops: Vec<String>,
    #[serde(default)]
    pub severity: Severity,
    pub is_healthy: bool,
}

impl AnalysisResult {
    /// Repair a verdict from an untrusted provider so it satisfies the
    /// model invariants: confidence capped at 100, and a healthy plant
    /// cannot simultaneously carry a detection.
    pub fn sanitized(mut self) -> Self {
        if self.confidence > 100 {
            self.confidence = 100;
        }
        if self.is_healthy {
            self.detected = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disease_round_trips_with_camel_case_names() {
        let json = serde_json::json!({
            "id": "d-1",
            "name": {"en": "Late Blight", "om": "", "am": ""},
            "cropType": "Potato",
            "featured": true,
            "images": ["a.jpg"],
            "symptoms": {"en": ["dark lesions"], "om": [], "am": []},
            "treatments": [{
                "chemicalId": "c-1",
                "chemicalName": "Mancozeb",
                "dosage": "2.5 kg/ha",
                "safetyInstructions": {"en": "Wear gloves", "om": "", "am": ""}
            }]
        });
        let disease: Disease = serde_json::from_value(json).unwrap();
        assert_eq!(disease.crop_type, "Potato");
        assert!(disease.featured);
        assert_eq!(disease.treatments[0].chemical_id, "c-1");

        let back = serde_json::to_value(&disease).unwrap();
        assert_eq!(back["cropType"], "Potato");
        assert_eq!(back["treatments"][0]["chemicalName"], "Mancozeb");
    }

    #[test]
    fn chemical_type_field_uses_wire_name() {
        let chem: Chemical =
            serde_json::from_value(serde_json::json!({"name": "X", "type": "Fungicide"})).unwrap();
        assert_eq!(chem.chemical_type, "Fungicide");
        assert_eq!(serde_json::to_value(&chem).unwrap()["type"], "Fungicide");
    }

    #[test]
    fn submission_status_terminality() {
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
    }

    #[test]
    fn comment_status_transitions_are_monotonic() {
        use CommentStatus::*;
        assert!(Unread.can_transition_to(Read));
        assert!(Unread.can_transition_to(Replied));
        assert!(Read.can_transition_to(Replied));

        assert!(!Replied.can_transition_to(Unread));
        assert!(!Replied.can_transition_to(Read));
        assert!(!Read.can_transition_to(Unread));
        assert!(!Unread.can_transition_to(Unread));
    }

    #[test]
    fn sanitized_enforces_healthy_excludes_detection() {
        let result = AnalysisResult {
            detected: true,
            disease_name: "Healthy Plant".to_string(),
            disease_name_amharic: None,
            disease_name_oromifa: None,
            confidence: 130,
            description: String::new(),
            symptoms: vec![],
            treatment: vec![],
            prevention: vec![],
            affected_crops: vec![],
            severity: Severity::Low,
            is_healthy: true,
        }
        .sanitized();

        assert!(!result.detected);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn severity_defaults_to_medium_when_absent() {
        let json = serde_json::json!({
            "detected": true,
            "diseaseName": "Leaf Spot",
            "confidence": 80,
            "isHealthy": false
        });
        let result: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.severity, Severity::Medium);
        assert!(result.symptoms.is_empty());
    }
}
