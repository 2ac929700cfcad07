/*!
 * Tests for the spreadsheet abstraction
 */

use subreview::errors::SheetError;
use subreview::sheet::google::{spreadsheet_id_from_url, GoogleSheets};
use subreview::sheet::memory::{FailPoint, MemoryBackend};
use subreview::sheet::{qualified_range, CellWrite, Color, Spreadsheet, SpreadsheetBackend};

use crate::common;

/// Test colour normalisation at the documented points
#[test]
fn test_colorToHex_atDocumentedPoints_shouldNormalise() {
    assert_eq!(Color::rgb(1.0, 1.0, 1.0).to_hex(), "#FFFFFF");
    assert_eq!(Color::default().to_hex(), "#FFFFFF");
    assert_eq!(Color::rgb(0.0, 0.0, 0.0).to_hex(), "#000000");
    assert!(Color::white().is_sentinel_white());
    assert!(!Color::rgb(0.85, 0.92, 0.83).is_sentinel_white());
}

/// Test worksheet-qualified ranges
#[test]
fn test_qualifiedRange_shouldQuoteSheetName() {
    assert_eq!(qualified_range("Task", "C2"), "'Task'!C2");
    assert_eq!(qualified_range("Bob's sheet", "A:Z"), "'Bob''s sheet'!A:Z");
}

/// Test spreadsheet id extraction from document URLs
#[test]
fn test_spreadsheetIdFromUrl_withVariousUrls_shouldExtractOrFail() {
    assert_eq!(
        spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/1xYz_9-Q/edit?usp=sharing").unwrap(),
        "1xYz_9-Q"
    );
    assert!(spreadsheet_id_from_url("https://docs.google.com/document/d/abc/edit").is_err());
}

/// Test that opening a non-spreadsheet URL fails before any request
#[tokio::test]
async fn test_googleSheets_openInvalidUrl_shouldFail() {
    let sheets = GoogleSheets::new("https://sheets.googleapis.com", "token", 5);

    let result = sheets.open_by_url("not a url").await;

    assert!(matches!(result, Err(SheetError::InvalidUrl(_))));
}

/// Test that a memory backend hands out shared documents
#[tokio::test]
async fn test_memoryBackend_openedDocument_shouldShareState() {
    let document = common::review_document("doc", &[("Hello", "こんちは")]);
    let backend = MemoryBackend::new().with_document("https://example.com/doc", document.clone());

    let opened = backend.open_by_url("https://example.com/doc").await.unwrap();
    opened
        .batch_write("Task", &[CellWrite::new("C", 2, "こんにちは")])
        .await
        .unwrap();

    assert_eq!(opened.id(), "doc");
    assert_eq!(document.cell("Task", "C2"), "こんにちは");
    assert_eq!(document.calls().batch_writes, 1);
}

/// Test failure injection on the in-memory document
#[tokio::test]
async fn test_memorySpreadsheet_withFailPoint_shouldFailThatCall() {
    let document = common::review_document("doc", &[("Hello", "こんちは")]).failing_on(FailPoint::ReadRows);

    assert!(document.read_all_rows("Task").await.is_err());
    assert!(document.read_column_formats("Task", "C", 2).await.is_ok());
}
