/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::replying(text)` - Always succeeds with a fixed completion
 * - `MockProvider::flaky(n, text)` - Fails transiently `n` times, then succeeds
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::unauthorized()` - Always fails with an auth error
 * - `MockProvider::slow(ms, text)` - Succeeds after a delay (for timeout testing)
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails with a 503 for the first `failures` requests
    Flaky { failures: usize },
    /// Always fails with a 500
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Sleeps before answering
    Slow { delay_ms: u64 },
}

/// Mock provider for testing review behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Completion returned on success
    response: String,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Prompts received, shared between clones
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior, response: impl Into<String>) -> Self {
        Self {
            behavior,
            response: response.into(),
            custom_response: None,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider that always answers with `response`
    pub fn replying(response: impl Into<String>) -> Self {
        Self::new(MockBehavior::Working, response)
    }

    /// Create a provider that fails transiently before answering
    pub fn flaky(failures: usize, response: impl Into<String>) -> Self {
        Self::new(MockBehavior::Flaky { failures }, response)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, "")
    }

    /// Create a provider that rejects credentials
    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized, "")
    }

    /// Create a provider that answers after `delay_ms`
    pub fn slow(delay_ms: u64, response: impl Into<String>) -> Self {
        Self::new(MockBehavior::Slow { delay_ms }, response)
    }

    /// Set a custom response generator, called with the prompt
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn answer(&self, prompt: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(prompt),
            None => self.response.clone(),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &str, _model: &str, _temperature: f32) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        match self.behavior {
            MockBehavior::Working => Ok(self.answer(prompt)),

            MockBehavior::Flaky { failures } => {
                if count < failures {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated transient failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.answer(prompt))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.answer(prompt))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
