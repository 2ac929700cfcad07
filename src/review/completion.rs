use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::CompletionConfig;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Sends the consolidated prompt to the completion service
///
/// Each attempt is bounded by a timeout. Transient failures are retried with
/// exponential backoff; anything else fails on the first attempt.
#[derive(Debug, Clone)]
pub struct CompletionRequester {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    timeout: Duration,
    /// Maximum number of retry attempts after the first
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    max_prompt_chars: Option<usize>,
}

impl CompletionRequester {
    /// Create a requester with no retries and a two-minute timeout
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            timeout: Duration::from_secs(120),
            max_retries: 0,
            backoff_base_ms: 1000,
            max_prompt_chars: None,
        }
    }

    /// Create a requester from completion settings
    pub fn from_config(provider: Arc<dyn Provider>, config: &CompletionConfig) -> Self {
        Self::new(provider, config.get_model(), config.temperature)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_retries(config.retry_count, config.retry_backoff_ms)
            .with_max_prompt_chars(config.max_prompt_chars)
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget and backoff base
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Reject prompts longer than `limit` characters
    pub fn with_max_prompt_chars(mut self, limit: Option<usize>) -> Self {
        self.max_prompt_chars = limit;
        self
    }

    /// Model used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Delay before retry number `attempt` (1-based), saturating at `u64::MAX`
    fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        self.backoff_base_ms.saturating_mul(factor)
    }

    /// Request one completion for `prompt`
    pub async fn request(&self, prompt: &str) -> Result<String, ProviderError> {
        if let Some(limit) = self.max_prompt_chars {
            let size = prompt.chars().count();
            if size > limit {
                error!("Prompt of {} characters exceeds the limit of {}", size, limit);
                return Err(ProviderError::PromptTooLarge { size, limit });
            }
        }

        let mut attempt: u32 = 0;
        loop {
            debug!(
                "Requesting completion from {} ({}), attempt {}/{}",
                self.provider.name(),
                self.model,
                attempt + 1,
                self.max_retries + 1
            );

            let outcome = match tokio::time::timeout(
                self.timeout,
                self.provider.complete(prompt, &self.model, self.temperature),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            };

            let e = match outcome {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            attempt += 1;
            if !e.is_transient() || attempt > self.max_retries {
                error!(
                    "{} completion failed: {} - attempt {}/{}",
                    self.provider.name(),
                    e,
                    attempt,
                    self.max_retries + 1
                );
                return Err(e);
            }

            let backoff_ms = self.backoff_ms(attempt);
            warn!(
                "{} completion failed: {} - retrying in {}ms (attempt {}/{})",
                self.provider.name(),
                e,
                backoff_ms,
                attempt,
                self.max_retries + 1
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }
    }
}
