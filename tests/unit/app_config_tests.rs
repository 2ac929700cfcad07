/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use subreview::app_config::{CompletionProvider, Config, LogLevel};
use subreview::review::{ColorPolicy, FormatStrategy};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.review.sheet_name, "Task");
    assert_eq!(config.review.master_sheet_name, "Sheet1");
    assert_eq!(config.review.row_marker, "行");
    assert_eq!(config.review.policy, ColorPolicy::StrictExplicit);
    assert_eq!(config.review.strategy, FormatStrategy::Bulk);
    assert!(config.review.require_empty_output);
    assert!(!config.review.dry_run);

    assert_eq!(config.completion.provider, CompletionProvider::OpenAI);
    assert_eq!(config.completion.get_model(), "gpt-4o");
    assert_eq!(config.completion.temperature, 0.5);
    assert_eq!(config.completion.retry_count, 3);

    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that a written config loads back unchanged
#[test]
fn test_config_writeThenLoad_shouldPreserveValues() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.master_url = "https://docs.google.com/spreadsheets/d/master/edit".to_string();
    config.completion.provider = CompletionProvider::Anthropic;
    config.completion.max_prompt_chars = Some(200_000);
    config.review.policy = ColorPolicy::DefaultWhite;
    config.review.strategy = FormatStrategy::PerCell;
    config.review.columns.guard = "E".to_string();
    config.write_to(&path)?;

    let loaded = Config::from_file(&path)?;

    assert_eq!(loaded.master_url, config.master_url);
    assert_eq!(loaded.completion.provider, CompletionProvider::Anthropic);
    assert_eq!(loaded.completion.get_model(), "claude-3-5-sonnet-latest");
    assert_eq!(loaded.completion.max_prompt_chars, Some(200_000));
    assert_eq!(loaded.review.policy, ColorPolicy::DefaultWhite);
    assert_eq!(loaded.review.strategy, FormatStrategy::PerCell);
    assert_eq!(loaded.review.columns, config.review.columns);
    Ok(())
}

/// Test that missing sections fall back to defaults
#[test]
fn test_config_fromPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("conf.json");
    fs::write(
        &path,
        r#"{ "review": { "policy": "default_white", "require_empty_output": false }, "log_level": "debug" }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.review.policy, ColorPolicy::DefaultWhite);
    assert!(!config.review.require_empty_output);
    assert_eq!(config.review.sheet_name, "Task");
    assert_eq!(config.review.columns.explanation, "E");
    assert_eq!(config.completion.timeout_secs, 120);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that a malformed file is reported with its path
#[test]
fn test_config_fromInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("conf.json");
    fs::write(&path, "{ not json")?;

    let error = Config::from_file(&path).unwrap_err();

    assert!(error.to_string().contains("Failed to parse config file"));
    Ok(())
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_err(), "missing API key");

    config.completion.api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());

    config.completion.temperature = 3.0;
    assert!(config.validate().is_err());
    config.completion.temperature = 0.5;

    config.review.columns.revised = "A".to_string();
    assert!(config.validate().is_err(), "output overlapping source");
    config.review.columns.revised = "C".to_string();

    config.review.columns.explanation = "D".to_string();
    assert!(config.validate().is_err(), "duplicate output columns");
    config.review.columns.explanation = "E".to_string();

    config.review.columns.color = "C3".to_string();
    assert!(config.validate().is_err());
    config.review.columns.color = "C".to_string();

    config.review.row_marker = "Row:".to_string();
    assert!(config.validate().is_err());
}
