/*!
 * Tests for completion provider implementations
 */

use subreview::app_config::{CompletionConfig, CompletionProvider};
use subreview::errors::ProviderError;
use subreview::providers::{self, Provider};
use subreview::providers::openai::{OpenAI, OpenAIResponse};
use subreview::providers::anthropic::Anthropic;
use subreview::providers::mock::MockProvider;

/// Test that the configured provider is built
#[test]
fn test_fromConfig_shouldBuildSelectedProvider() {
    let mut config = CompletionConfig::default();
    config.api_key = "key".to_string();
    assert_eq!(providers::from_config(&config).name(), "openai");

    config.provider = CompletionProvider::Anthropic;
    assert_eq!(providers::from_config(&config).name(), "anthropic");
}

/// Test that debug output never leaks the API key
#[test]
fn test_providerDebug_shouldHideApiKey() {
    let openai = format!("{:?}", OpenAI::new("sk-secret", "https://api.openai.com/v1", 100));
    let anthropic = format!("{:?}", Anthropic::new("sk-ant-secret", "", 100));

    assert!(!openai.contains("sk-secret"));
    assert!(!anthropic.contains("sk-ant-secret"));
}

/// Test text extraction from a chat completion
#[test]
fn test_openAiExtractText_shouldUseFirstChoice() {
    let json = r#"{
        "choices": [
            {"message": {"role": "assistant", "content": "行 2: こんにちは | No Error | "}},
            {"message": {"role": "assistant", "content": "ignored"}}
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    }"#;
    let response: OpenAIResponse = serde_json::from_str(json).unwrap();

    assert_eq!(OpenAI::extract_text_from_response(&response), "行 2: こんにちは | No Error | ");
}

/// Test that an unreachable endpoint is reported as a transient connection error
#[tokio::test]
async fn test_openAi_withUnreachableEndpoint_shouldReturnConnectionError() {
    let client = OpenAI::new("key", "http://127.0.0.1:1", 16);

    let result = client.complete("prompt", "gpt-4o", 0.5).await;

    match result {
        Err(e @ ProviderError::ConnectionError(_)) => assert!(e.is_transient()),
        other => panic!("expected a connection error, got {:?}", other),
    }
}

/// Test the mock provider used throughout the suite
#[tokio::test]
async fn test_mockProvider_withCustomResponse_shouldEchoRows() {
    let provider = MockProvider::replying("unused").with_custom_response(|prompt| {
        if prompt.contains("Row 2") {
            "行 2: ok | No Error |".to_string()
        } else {
            String::new()
        }
    });

    let text = provider.complete("Row 2\nTarget: hi", "m", 0.5).await.unwrap();

    assert_eq!(text, "行 2: ok | No Error |");
    assert_eq!(provider.prompts(), vec!["Row 2\nTarget: hi".to_string()]);
}
