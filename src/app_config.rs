use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::review::eligibility::{ColorPolicy, FormatStrategy};
use crate::sheet::column_index;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// URL of the master index spreadsheet (column A lists documents)
    #[serde(default)]
    pub master_url: String,

    /// Review pipeline settings
    #[serde(default)]
    pub review: ReviewConfig,

    /// Completion service settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Spreadsheet service settings
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Completion provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl CompletionProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }
}

impl std::fmt::Display for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for CompletionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Completion service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: CompletionProvider,

    /// Model name; empty selects the provider default
    #[serde(default = "String::new")]
    pub model: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL; empty selects the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Temperature parameter for text generation
    /// Kept low so error categories stay stable between runs
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for transient failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Reject prompts longer than this many characters
    #[serde(default)]
    pub max_prompt_chars: Option<usize>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProvider::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_tokens: default_max_tokens(),
            max_prompt_chars: None,
        }
    }
}

impl CompletionConfig {
    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }

        match self.provider {
            CompletionProvider::OpenAI => default_openai_model(),
            CompletionProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        match self.provider {
            CompletionProvider::OpenAI => default_openai_endpoint(),
            CompletionProvider::Anthropic => default_anthropic_endpoint(),
        }
    }
}

/// Spreadsheet service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SheetsConfig {
    /// Sheets API base URL
    #[serde(default = "default_sheets_endpoint")]
    pub endpoint: String,

    /// OAuth bearer token
    #[serde(default = "String::new")]
    pub access_token: String,

    /// Request timeout in seconds
    #[serde(default = "default_sheets_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sheets_endpoint(),
            access_token: String::new(),
            timeout_secs: default_sheets_timeout_secs(),
        }
    }
}

/// Where each field of a review row lives in the worksheet
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Source transcript line
    #[serde(default = "default_source_column")]
    pub source: String,
    /// First-pass machine translation
    #[serde(default = "default_first_pass_column")]
    pub first_pass: String,
    /// Revised translation (output)
    #[serde(default = "default_revised_column")]
    pub revised: String,
    /// Error category (output)
    #[serde(default = "default_category_column")]
    pub category: String,
    /// Explanation for the catch-all category (output)
    #[serde(default = "default_explanation_column")]
    pub explanation: String,
    /// Column whose background colour flags a row for review
    #[serde(default = "default_revised_column")]
    pub color: String,
    /// Column that must be empty for a row to be reviewed
    #[serde(default = "default_category_column")]
    pub guard: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            source: default_source_column(),
            first_pass: default_first_pass_column(),
            revised: default_revised_column(),
            category: default_category_column(),
            explanation: default_explanation_column(),
            color: default_revised_column(),
            guard: default_category_column(),
        }
    }
}

/// Review pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReviewConfig {
    /// Worksheet holding the rows to review
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Worksheet of the master index listing document URLs
    #[serde(default = "default_master_sheet_name")]
    pub master_sheet_name: String,

    /// Column layout
    #[serde(default)]
    pub columns: ColumnLayout,

    /// How a background colour decides eligibility
    #[serde(default)]
    pub policy: ColorPolicy,

    /// How background colours are fetched
    #[serde(default)]
    pub strategy: FormatStrategy,

    /// Only review rows whose guard column is still empty
    #[serde(default = "default_true")]
    pub require_empty_output: bool,

    /// Pause between per-cell format probes in milliseconds
    #[serde(default = "default_probe_delay_ms")]
    pub probe_delay_ms: u64,

    /// Token that starts every result line
    #[serde(default = "default_row_marker")]
    pub row_marker: String,

    /// List the error taxonomy in the prompt
    #[serde(default = "default_true")]
    pub include_taxonomy: bool,

    /// Log prompts and completions at info level
    #[serde(default)]
    pub debug: bool,

    /// Plan writes without sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            master_sheet_name: default_master_sheet_name(),
            columns: ColumnLayout::default(),
            policy: ColorPolicy::default(),
            strategy: FormatStrategy::default(),
            require_empty_output: true,
            probe_delay_ms: default_probe_delay_ms(),
            row_marker: default_row_marker(),
            include_taxonomy: true,
            debug: false,
            dry_run: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_temperature() -> f32 {
    0.5
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_sheets_timeout_secs() -> u64 {
    60
}

fn default_probe_delay_ms() -> u64 {
    1000 // stays under the per-user read quota of the Sheets API
}

fn default_true() -> bool {
    true
}

fn default_sheet_name() -> String {
    "Task".to_string()
}

fn default_master_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_row_marker() -> String {
    "行".to_string()
}

fn default_source_column() -> String {
    "A".to_string()
}

fn default_first_pass_column() -> String {
    "B".to_string()
}

fn default_revised_column() -> String {
    "C".to_string()
}

fn default_category_column() -> String {
    "D".to_string()
}

fn default_explanation_column() -> String {
    "E".to_string()
}

fn default_sheets_endpoint() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))
    }

    /// Write this configuration as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let review = &self.review;
        if review.sheet_name.trim().is_empty() {
            return Err(anyhow!("Review worksheet name must not be empty"));
        }
        if review.row_marker.trim().is_empty() {
            return Err(anyhow!("Row marker must not be empty"));
        }
        if review.row_marker.contains(':') || review.row_marker.contains('|') {
            return Err(anyhow!("Row marker must not contain ':' or '|'"));
        }

        let columns = &review.columns;
        for (name, column) in [
            ("source", &columns.source),
            ("first_pass", &columns.first_pass),
            ("revised", &columns.revised),
            ("category", &columns.category),
            ("explanation", &columns.explanation),
            ("color", &columns.color),
            ("guard", &columns.guard),
        ] {
            column_index(column)
                .map_err(|_| anyhow!("Invalid column letter for {}: '{}'", name, column))?;
        }

        let outputs = [&columns.revised, &columns.category, &columns.explanation];
        let inputs = [&columns.source, &columns.first_pass];
        for output in outputs {
            if inputs.iter().any(|input| input.eq_ignore_ascii_case(output)) {
                return Err(anyhow!("Output column {} overlaps an input column", output));
            }
        }
        if outputs[0].eq_ignore_ascii_case(outputs[1])
            || outputs[0].eq_ignore_ascii_case(outputs[2])
            || outputs[1].eq_ignore_ascii_case(outputs[2])
        {
            return Err(anyhow!("Output columns must be distinct"));
        }

        let completion = &self.completion;
        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", completion.temperature));
        }
        if completion.api_key.is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider",
                completion.provider.display_name()
            ));
        }

        Ok(())
    }
}
