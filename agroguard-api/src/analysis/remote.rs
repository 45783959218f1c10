//! Remote analysis provider: hosted vision model client
//!
//! Sends the image plus a fixed instruction prompt to the Gemini
//! `generateContent` endpoint and expects exactly one JSON object back in
//! the response text. Model output is untrusted: surrounding code-fence
//! markers are stripped before parsing and the parsed verdict is sanitized.
//! Quota exhaustion is detected from the error body and reported as its
//! own kind so the orchestrator can fall back without escalating.

use agroguard_common::models::AnalysisResult;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{AnalysisProvider, ProviderError};

/// Hosted vision model endpoint
const VISION_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Default timeout for vision model requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed instruction prompt. The model must answer with a single JSON
/// object matching the `AnalysisResult` wire shape.
const ANALYSIS_PROMPT: &str = r#"You are an expert agricultural pathologist and crop disease specialist. Analyze this image of a crop/plant and identify any diseases or health issues.

IMPORTANT: Respond ONLY with a valid JSON object, no markdown, no code blocks, just pure JSON.

If you detect a disease or health issue, respond with this exact JSON structure:
{
  "detected": true,
  "diseaseName": "English name of the disease",
  "diseaseNameAmharic": "Disease name in Amharic script",
  "diseaseNameOromifa": "Disease name in Oromifa/Afaan Oromo",
  "confidence": 85,
  "description": "Brief description of the disease",
  "symptoms": ["symptom 1", "symptom 2", "symptom 3"],
  "treatment": ["treatment step 1", "treatment step 2", "treatment step 3"],
  "prevention": ["prevention tip 1", "prevention tip 2"],
  "affectedCrops": ["crop1", "crop2"],
  "severity": "medium",
  "isHealthy": false
}

If the plant appears healthy, respond with:
{
  "detected": false,
  "diseaseName": "Healthy Plant",
  "diseaseNameAmharic": "ጤናማ ተክል",
  "diseaseNameOromifa": "Biqiltuu Fayyaa",
  "confidence": 90,
  "description": "The plant appears to be healthy with no visible signs of disease.",
  "symptoms": [],
  "treatment": ["Continue regular care and monitoring"],
  "prevention": ["Maintain good agricultural practices", "Regular inspection"],
  "affectedCrops": [],
  "severity": "low",
  "isHealthy": true
}

If this is not a plant/crop image, respond with:
{
  "detected": false,
  "diseaseName": "Not a Plant Image",
  "confidence": 0,
  "description": "This does not appear to be an image of a plant or crop. Please upload a clear image of the affected plant.",
  "symptoms": [],
  "treatment": [],
  "prevention": [],
  "affectedCrops": [],
  "severity": "low",
  "isHealthy": false
}

Confidence should be a number between 0-100.
Severity should be "low", "medium", or "high"."#;

/// Client for the hosted vision model
pub struct VisionProvider {
    http: Client,
    api_key: String,
}

impl VisionProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            api_key: api_key.into(),
        }
    }
}

// ============================================================================
// Vision API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

/// Strip surrounding Markdown code-fence markers the model sometimes adds
/// despite the prompt forbidding them.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

#[async_trait]
impl AnalysisProvider for VisionProvider {
    fn name(&self) -> &'static str {
        "vision-remote"
    }

    async fn analyze(&self, image: &[u8]) -> Result<AnalysisResult, ProviderError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": ANALYSIS_PROMPT },
                    {
                        "inline_data": {
                            "mime_type": "image/jpeg",
                            "data": encoded
                        }
                    }
                ]
            }],
            "generationConfig": {
                "temperature": 0.4,
                "topK": 32,
                "topP": 1,
                "maxOutputTokens": 2048
            }
        });

        debug!(image_bytes = image.len(), "sending image to vision model");

        let response = self
            .http
            .post(format!("{}?key={}", VISION_API_URL, self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(format!("vision request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            if error_body.to_lowercase().contains("quota") {
                return Err(ProviderError::Quota);
            }
            return Err(ProviderError::Http(format!(
                "vision API returned {}: {}",
                status, error_body
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("malformed API envelope: {}", e)))?;

        let text = parsed.into_text().ok_or(ProviderError::EmptyResponse)?;
        let cleaned = strip_code_fences(&text);

        let result: AnalysisResult = serde_json::from_str(cleaned)
            .map_err(|e| ProviderError::Parse(format!("verdict is not valid JSON: {}", e)))?;

        debug!(
            disease = %result.disease_name,
            confidence = result.confidence,
            "vision model verdict"
        );

        Ok(result.sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let text = "```json\n{\"detected\": true}\n```";
        assert_eq!(strip_code_fences(text), "{\"detected\": true}");
    }

    #[test]
    fn strips_bare_fence() {
        let text = "```\n{\"detected\": false}\n```";
        assert_eq!(strip_code_fences(text), "{\"detected\": false}");
    }

    #[test]
    fn leaves_plain_json_untouched() {
        let text = "  {\"detected\": false}  ";
        assert_eq!(strip_code_fences(text), "{\"detected\": false}");
    }

    #[test]
    fn handles_fence_without_trailing_marker() {
        let text = "```json\n{\"a\": 1}";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn envelope_text_extraction() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "hello" }] }
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("hello"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(parsed.into_text().is_none());

        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn fenced_verdict_parses_into_result() {
        let text = r#"```json
{
  "detected": true,
  "diseaseName": "Late Blight",
  "confidence": 88,
  "description": "Fungal disease",
  "symptoms": ["dark lesions"],
  "treatment": ["apply fungicide"],
  "prevention": ["resistant varieties"],
  "affectedCrops": ["Potato"],
  "severity": "high",
  "isHealthy": false
}
```"#;
        let result: AnalysisResult = serde_json::from_str(strip_code_fences(text)).unwrap();
        assert!(result.detected);
        assert_eq!(result.confidence, 88);
    }
}
