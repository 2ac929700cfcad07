/*!
 * Provider implementations for the completion service.
 *
 * This module contains client implementations for the LLM providers used to
 * review translations:
 * - OpenAI: Chat Completions API (default)
 * - Anthropic: Messages API
 * - Mock: scripted responses for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{CompletionConfig, CompletionProvider};
use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// A provider turns one prompt into one free-text completion. Retry and
/// timeout policy live above this trait, in `review::completion`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a prompt
    ///
    /// # Arguments
    /// * `prompt` - The full user prompt
    /// * `model` - Model identifier understood by the provider
    /// * `temperature` - Sampling temperature
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The completion text or an error
    async fn complete(&self, prompt: &str, model: &str, temperature: f32) -> Result<String, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Build the configured provider
pub fn from_config(config: &CompletionConfig) -> Arc<dyn Provider> {
    match config.provider {
        CompletionProvider::OpenAI => Arc::new(openai::OpenAI::new(
            config.api_key.clone(),
            config.get_endpoint(),
            config.max_tokens,
        )),
        CompletionProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.api_key.clone(),
            config.get_endpoint(),
            config.max_tokens,
        )),
    }
}

pub mod anthropic;
pub mod mock;
pub mod openai;
