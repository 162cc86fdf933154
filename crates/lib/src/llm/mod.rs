//! Generative-text backend: single-turn prompt in, text out.
//!
//! The dispatcher talks to the [`TextGenerator`] trait; [`GeminiClient`] is the HTTP implementation.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("generative request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generative api error: {0}")]
    Api(String),
    /// Response parsed but a required field was absent (e.g. no candidates).
    #[error("generative response malformed: {0}")]
    Malformed(String),
    #[error("generative backend not configured: {0}")]
    NotConfigured(&'static str),
}

/// Produces text for a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
