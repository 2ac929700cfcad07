/*!
 * Error types for the subreview application.
 *
 * This module contains custom error types for the different layers of the
 * review pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when working with completion provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete within the configured time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The prompt exceeds the configured request size
    #[error("Prompt of {size} characters exceeds the limit of {limit}")]
    PromptTooLarge {
        /// Prompt length in characters
        size: usize,
        /// Configured maximum
        limit: usize,
    },
}

impl ProviderError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            _ => false,
        }
    }

    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can occur when talking to the spreadsheet store
#[derive(Error, Debug)]
pub enum SheetError {
    /// The document URL does not identify a spreadsheet
    #[error("Invalid spreadsheet URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure
    #[error("Spreadsheet request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the spreadsheet API
    #[error("Spreadsheet API error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The API answered with a body we could not decode
    #[error("Failed to parse spreadsheet response: {0}")]
    ParseError(String),

    /// The named document or worksheet does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A cell or column address could not be interpreted
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),
}

/// Errors that abort the review of a single document
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The configured column layout is unusable
    #[error("Invalid column layout: {0}")]
    InvalidLayout(#[source] SheetError),

    /// The document could not be opened
    #[error("Failed to open document: {0}")]
    Open(#[source] SheetError),

    /// Reading the row values failed
    #[error("Failed to read rows: {0}")]
    ReadRows(#[source] SheetError),

    /// Reading background colours failed (bulk mode)
    #[error("Failed to fetch cell formats: {0}")]
    FormatFetch(#[source] SheetError),

    /// The completion service failed
    #[error("Completion service error: {0}")]
    Service(#[from] ProviderError),

    /// The batch write failed
    #[error("Failed to write results: {0}")]
    Write(#[source] SheetError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the spreadsheet store
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Error from reviewing one document
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// A document in a multi-document run failed
    #[error("Error processing {url}: {source}")]
    Document {
        /// Document URL
        url: String,
        /// Underlying failure
        #[source]
        source: ReviewError,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
