//! Image analysis providers
//!
//! A provider turns raw image bytes into a structured [`AnalysisResult`].
//! Two implementations exist: [`VisionProvider`] calls a hosted vision
//! model, and [`SimulatedProvider`] is a deterministic local stand-in.
//! [`Orchestrator`] chains them with quota-aware fallback.

pub mod orchestrator;
pub mod remote;
pub mod simulated;

pub use orchestrator::{AnalysisOutcome, AnalysisState, Orchestrator};
pub use remote::VisionProvider;
pub use simulated::SimulatedProvider;

use agroguard_common::models::AnalysisResult;
use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of an analysis provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or non-success HTTP status
    #[error("provider HTTP error: {0}")]
    Http(String),

    /// The provider reported its usage quota as exhausted
    #[error("provider quota exhausted")]
    Quota,

    /// The provider answered but carried no usable text
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The provider's text was not a well-formed verdict
    #[error("failed to parse provider output: {0}")]
    Parse(String),

    /// The submitted image cannot be analyzed (too small / too large).
    /// This is the only provider error surfaced to users.
    #[error("{0}")]
    InvalidImage(String),
}

/// One call turning an image into a disease verdict
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn analyze(&self, image: &[u8]) -> Result<AnalysisResult, ProviderError>;
}
