/// Generative-model provider abstraction
///
/// This module provides a pluggable architecture for text-generation backends.
/// The only operation the service needs is prompt-in/free-text-out; everything
/// recommendation-specific (prompt wording, JSON extraction, fallbacks) lives
/// in the recommendation service, not in the provider.
use crate::error::AppResult;

pub mod gemini;

/// Fixed sampling parameters for a generation call
///
/// These are configuration constants, never caller-controlled.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: i32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
            max_output_tokens: 512,
        }
    }
}

/// Trait for text-generation providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a free-text completion for the given prompt
    ///
    /// Returns the raw model text. The caller owns any cleanup or parsing of
    /// the reply; providers only surface transport and API failures.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<String>;

    /// Model identifier reported in responses and logs
    fn model_id(&self) -> &str;
}
