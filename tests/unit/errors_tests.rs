/*!
 * Tests for error types
 */

use std::error::Error;
use std::time::Duration;

use subreview::errors::{AppError, ProviderError, ReviewError, SheetError};

/// Test which provider errors are worth retrying
#[test]
fn test_providerError_isTransient_shouldFollowErrorKind() {
    assert!(ProviderError::ConnectionError("reset".to_string()).is_transient());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_transient());
    assert!(ProviderError::Timeout(Duration::from_secs(1)).is_transient());
    assert!(ProviderError::ApiError { status_code: 502, message: "bad gateway".to_string() }.is_transient());

    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_transient());
    assert!(!ProviderError::ApiError { status_code: 400, message: "bad request".to_string() }.is_transient());
    assert!(!ProviderError::ParseError("eof".to_string()).is_transient());
    assert!(!ProviderError::PromptTooLarge { size: 10, limit: 5 }.is_transient());
}

/// Test HTTP status mapping
#[test]
fn test_providerError_fromStatus_shouldMapKnownCodes() {
    assert!(matches!(ProviderError::from_status(401, String::new()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, String::new()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, String::new()), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(500, "oops".to_string()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

/// Test the per-document failure message
#[test]
fn test_documentError_display_shouldNameUrlAndKeepSource() {
    let error = AppError::Document {
        url: "https://example.com/doc".to_string(),
        source: ReviewError::FormatFetch(SheetError::RequestFailed("timeout".to_string())),
    };

    assert_eq!(
        error.to_string(),
        "Error processing https://example.com/doc: Failed to fetch cell formats: Spreadsheet request failed: timeout"
    );
    assert!(error.source().is_some());
}

/// Test conversions into the application error
#[test]
fn test_appError_conversions_shouldWrapLayers() {
    let from_provider: AppError = ProviderError::ParseError("x".to_string()).into();
    assert!(matches!(from_provider, AppError::Provider(_)));

    let from_sheet: AppError = SheetError::NotFound("doc".to_string()).into();
    assert!(matches!(from_sheet, AppError::Sheet(_)));

    let from_review: AppError = ReviewError::Service(ProviderError::Timeout(Duration::from_secs(2))).into();
    assert!(matches!(from_review, AppError::Review(_)));

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(from_anyhow, AppError::Unknown(_)));
}
