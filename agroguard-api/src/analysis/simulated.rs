//! Local analysis provider: deterministic simulator
//!
//! Produces a plausible verdict without any network I/O. The verdict is a
//! pure function of the image byte length and the clock: a seed mixes
//! `len % 1000` with `now_millis % 10000`, selects the healthy branch for
//! roughly 30% of seeds, and picks a template from fixed catalogs. The
//! 1-3 second latency of a real model call is simulated from the same seed
//! and can be disabled for tests, as can the system clock.

use agroguard_common::models::{AnalysisResult, Severity};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::debug;

use super::{AnalysisProvider, ProviderError};

/// Payloads below this are rejected as corrupted/unusable
pub const MIN_IMAGE_BYTES: usize = 100;
/// Payloads above this are rejected (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// One canned verdict
struct Template {
    name: &'static str,
    name_amharic: &'static str,
    name_oromifa: &'static str,
    description: &'static str,
    symptoms: &'static [&'static str],
    treatment: &'static [&'static str],
    prevention: &'static [&'static str],
    affected_crops: &'static [&'static str],
    severity: Severity,
}

const DISEASE_TEMPLATES: [Template; 5] = [
    Template {
        name: "Late Blight",
        name_amharic: "ዘግይቶ ብሊት",
        name_oromifa: "Dhukkuba Boqqolloo",
        description: "A serious fungal disease that affects potato and tomato plants, causing dark lesions on leaves and stems.",
        symptoms: &[
            "Dark brown or black lesions on leaves",
            "White fuzzy growth on underside of leaves",
            "Stems may become infected and break",
            "Tubers develop brown rot",
        ],
        treatment: &[
            "Remove and destroy infected plant parts immediately",
            "Apply copper-based fungicide spray",
            "Improve air circulation around plants",
            "Avoid overhead watering",
        ],
        prevention: &[
            "Plant resistant varieties when available",
            "Ensure good drainage and air circulation",
            "Avoid watering leaves directly",
            "Remove plant debris at end of season",
        ],
        affected_crops: &["Potato", "Tomato"],
        severity: Severity::High,
    },
    Template {
        name: "Powdery Mildew",
        name_amharic: "ዱቄታማ ሻጋታ",
        name_oromifa: "Dhukkuba Daakuu",
        description: "A common fungal disease that appears as white powdery spots on leaves and stems.",
        symptoms: &[
            "White powdery spots on leaves",
            "Yellowing of affected leaves",
            "Stunted plant growth",
            "Distorted leaf shape",
        ],
        treatment: &[
            "Apply baking soda solution (1 tsp per quart water)",
            "Use neem oil spray",
            "Remove affected leaves",
            "Improve air circulation",
        ],
        prevention: &[
            "Plant in sunny locations with good air flow",
            "Avoid overhead watering",
            "Space plants properly",
            "Choose resistant varieties",
        ],
        affected_crops: &["Cucumber", "Squash", "Tomato", "Bean"],
        severity: Severity::Medium,
    },
    Template {
        name: "Bacterial Wilt",
        name_amharic: "የባክቴሪያ ዊልት",
        name_oromifa: "Dhukkuba Baakteeriyaa",
        description: "A bacterial disease that causes plants to wilt and die, often affecting the vascular system.",
        symptoms: &[
            "Sudden wilting of leaves",
            "Brown streaks in stem when cut",
            "Yellowing of lower leaves first",
            "Plant death within days",
        ],
        treatment: &[
            "Remove and destroy infected plants immediately",
            "Disinfect tools between plants",
            "Apply copper-based bactericide",
            "Improve soil drainage",
        ],
        prevention: &[
            "Use certified disease-free seeds",
            "Rotate crops annually",
            "Avoid working with wet plants",
            "Control insect vectors",
        ],
        affected_crops: &["Tomato", "Pepper", "Eggplant", "Potato"],
        severity: Severity::High,
    },
    Template {
        name: "Leaf Spot",
        name_amharic: "የቅጠል ነጠብጣ",
        name_oromifa: "Tuqaa Baalaa",
        description: "A fungal disease causing circular spots on leaves, common in humid conditions.",
        symptoms: &[
            "Small circular spots on leaves",
            "Spots may have yellow halos",
            "Leaves may turn yellow and drop",
            "Reduced plant vigor",
        ],
        treatment: &[
            "Remove affected leaves",
            "Apply fungicide spray",
            "Improve air circulation",
            "Reduce leaf wetness",
        ],
        prevention: &[
            "Water at soil level, not on leaves",
            "Space plants for good air flow",
            "Remove plant debris",
            "Use drip irrigation",
        ],
        affected_crops: &["Bean", "Cucumber", "Tomato", "Pepper"],
        severity: Severity::Low,
    },
    Template {
        name: "Root Rot",
        name_amharic: "የሥር ብስባሽ",
        name_oromifa: "Tortoruu Hidda",
        description: "A soil-borne disease that affects plant roots, causing poor growth and wilting.",
        symptoms: &[
            "Stunted plant growth",
            "Yellowing leaves",
            "Wilting despite moist soil",
            "Dark, mushy roots",
        ],
        treatment: &[
            "Improve soil drainage immediately",
            "Reduce watering frequency",
            "Apply fungicide to soil",
            "Remove severely affected plants",
        ],
        prevention: &[
            "Ensure proper soil drainage",
            "Avoid overwatering",
            "Use raised beds if needed",
            "Rotate crops regularly",
        ],
        affected_crops: &["Most vegetables", "Beans", "Peas", "Cucumber"],
        severity: Severity::Medium,
    },
];

const HEALTHY_TEMPLATES: [Template; 2] = [
    Template {
        name: "Healthy Plant",
        name_amharic: "ጤናማ ተክል",
        name_oromifa: "Biqiltuu Fayyaa",
        description: "The plant appears to be healthy with no visible signs of disease. Continue with regular care and monitoring.",
        symptoms: &[],
        treatment: &[
            "Continue regular watering and fertilizing",
            "Monitor for any changes",
            "Maintain good garden hygiene",
        ],
        prevention: &[
            "Keep up current care routine",
            "Regular inspection for early detection",
            "Maintain proper spacing and air circulation",
        ],
        affected_crops: &[],
        severity: Severity::Low,
    },
    Template {
        name: "Vigorous Growth",
        name_amharic: "ጠንካራ እድገት",
        name_oromifa: "Guddina Cimaa",
        description: "Excellent plant health with strong growth patterns. This plant shows optimal growing conditions.",
        symptoms: &[],
        treatment: &[
            "Maintain current care routine",
            "Consider light pruning for better shape",
            "Continue monitoring",
        ],
        prevention: &[
            "Keep soil moisture consistent",
            "Maintain current fertilization schedule",
            "Watch for overcrowding",
        ],
        affected_crops: &[],
        severity: Severity::Low,
    },
];

/// Deterministic local provider
pub struct SimulatedProvider {
    /// Millisecond clock, injectable for deterministic tests
    now_millis: fn() -> u64,
    simulate_latency: bool,
}

fn system_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            now_millis: system_millis,
            simulate_latency: true,
        }
    }

    /// Replace the clock (tests)
    pub fn with_clock(mut self, now_millis: fn() -> u64) -> Self {
        self.now_millis = now_millis;
        self
    }

    /// Skip the simulated processing delay (tests)
    pub fn without_latency(mut self) -> Self {
        self.simulate_latency = false;
        self
    }

    /// Seed mixing image size with the clock
    pub fn seed_for(image_len: usize, now_millis: u64) -> u64 {
        (image_len % 1000) as u64 + now_millis % 10000
    }

    fn verdict_for(seed: u64) -> AnalysisResult {
        // ~30% of seeds land on the healthy branch
        let is_healthy = seed % 10 < 3;

        let (template, confidence) = if is_healthy {
            let template = &HEALTHY_TEMPLATES[(seed % HEALTHY_TEMPLATES.len() as u64) as usize];
            (template, 85 + (seed % 15) as u8)
        } else {
            let template = &DISEASE_TEMPLATES[(seed % DISEASE_TEMPLATES.len() as u64) as usize];
            (template, 70 + (seed % 25) as u8)
        };

        AnalysisResult {
            detected: !is_healthy,
            disease_name: template.name.to_string(),
            disease_name_amharic: Some(template.name_amharic.to_string()),
            disease_name_oromifa: Some(template.name_oromifa.to_string()),
            confidence,
            description: template.description.to_string(),
            symptoms: template.symptoms.iter().map(|s| s.to_string()).collect(),
            treatment: template.treatment.iter().map(|s| s.to_string()).collect(),
            prevention: template.prevention.iter().map(|s| s.to_string()).collect(),
            affected_crops: template
                .affected_crops
                .iter()
                .map(|s| s.to_string())
                .collect(),
            severity: template.severity,
            is_healthy,
        }
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisProvider for SimulatedProvider {
    fn name(&self) -> &'static str {
        "simulator"
    }

    async fn analyze(&self, image: &[u8]) -> Result<AnalysisResult, ProviderError> {
        if image.len() < MIN_IMAGE_BYTES {
            return Err(ProviderError::InvalidImage(
                "Image too small or corrupted. Please upload a clear image of the plant."
                    .to_string(),
            ));
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(ProviderError::InvalidImage(
                "Image too large. Please use an image under 10MB.".to_string(),
            ));
        }

        let seed = Self::seed_for(image.len(), (self.now_millis)());

        if self.simulate_latency {
            // emulate 1-3s of model processing time
            let delay_ms = 1000 + seed % 2000;
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let result = Self::verdict_for(seed);
        debug!(
            seed,
            disease = %result.disease_name,
            confidence = result.confidence,
            healthy = result.is_healthy,
            "simulated analysis verdict"
        );
        Ok(result)
    }
}
