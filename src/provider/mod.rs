//! Boundary to the generative AI service.
//!
//! The gateway only needs [`GenerationProvider`]: prompt in, artifact out.
//! Pairing text and narrated audio go through [`TastingService`] and are
//! never cached.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use crate::error::ProviderError;
use crate::models::{Artifact, PairingResponse};

/// Produces an artifact (an image, in practice) for a text prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Artifact, ProviderError>;
}

/// Pairing advisor and audio narration.
#[async_trait]
pub trait TastingService: Send + Sync {
    async fn pairing_suggestion(&self, query: &str) -> Result<PairingResponse, ProviderError>;

    async fn tasting_audio(&self, text: &str) -> Result<Artifact, ProviderError>;
}
