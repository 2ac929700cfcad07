/*!
 * Integration tests for multi-document runs
 */

use anyhow::Result;

use subreview::errors::{AppError, ReviewError};
use subreview::providers::mock::MockProvider;
use subreview::review::UpdateOutcome;
use subreview::sheet::memory::{FailPoint, MemoryBackend};

use crate::common::{self, MASTER_URL};

const DOC1: &str = "https://docs.google.com/spreadsheets/d/doc1/edit";
const DOC2: &str = "https://docs.google.com/spreadsheets/d/doc2/edit";

/// Document URLs come from column A below the header, blanks dropped
#[tokio::test]
async fn test_readDocumentUrls_shouldSkipHeaderAndBlanks() -> Result<()> {
    let padded = format!("  {}  ", DOC2);
    let backend = MemoryBackend::new()
        .with_document(MASTER_URL, common::master_index(&[DOC1, "", "  ", padded.as_str()]));
    let controller = common::controller(&backend, &MockProvider::replying(""));

    let urls = controller.read_document_urls().await?;

    assert_eq!(urls, vec![DOC1.to_string(), DOC2.to_string()]);
    Ok(())
}

/// A failing document does not stop the next one
#[tokio::test]
async fn test_run_withFirstDocumentFailing_shouldStillReviewSecond() -> Result<()> {
    common::init_logger();
    let doc1 = common::mark_white(common::review_document("doc1", &[("Hello", "こんちは")]), &[2])
        .failing_on(FailPoint::ColumnFormats);
    let doc2 = common::mark_white(common::review_document("doc2", &[("Hello", "こんちは")]), &[2]);
    let backend = MemoryBackend::new()
        .with_document(MASTER_URL, common::master_index(&[DOC1, DOC2]))
        .with_document(DOC1, doc1.clone())
        .with_document(DOC2, doc2.clone());
    let provider = MockProvider::replying("行 2: こんにちは | Minor Error - Unnatural Phrasing | ");

    let summary = common::controller(&backend, &provider).run().await?;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.rows_written, 1);
    match &summary.failures[..] {
        [AppError::Document { url, source: ReviewError::FormatFetch(_) }] => assert_eq!(url, DOC1),
        other => panic!("unexpected failures: {:?}", other),
    }

    assert_eq!(doc1.calls().batch_writes, 0);
    assert_eq!(doc2.cell("Task", "C2"), "こんにちは");
    assert_eq!(doc2.cell("Task", "D2"), "Minor Error - Unnatural Phrasing");
    assert_eq!(provider.request_count(), 1);
    Ok(())
}

/// An unknown document is reported as an open failure for that URL only
#[tokio::test]
async fn test_runDocuments_withMissingDocument_shouldIsolateOpenFailure() {
    let doc2 = common::mark_white(common::review_document("doc2", &[("Bye", "さよなら")]), &[2]);
    let backend = MemoryBackend::new().with_document(DOC2, doc2);
    let provider = MockProvider::replying("行 2: さようなら | No Error |");

    let summary = common::controller(&backend, &provider)
        .run_documents(&[DOC1.to_string(), DOC2.to_string()])
        .await;

    assert_eq!(summary.failures.len(), 1);
    assert!(matches!(&summary.failures[0], AppError::Document { source: ReviewError::Open(_), .. }));
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].outcome, UpdateOutcome::Written { rows: 1, cells: 2 });
}

/// A completion failure aborts that document without writes
#[tokio::test]
async fn test_reviewDocument_withServiceFailure_shouldNotWrite() {
    let doc1 = common::mark_white(common::review_document("doc1", &[("Hello", "こんちは")]), &[2]);
    let backend = MemoryBackend::new().with_document(DOC1, doc1.clone());

    let result = common::controller(&backend, &MockProvider::unauthorized())
        .review_document(DOC1)
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, AppError::Document { source: ReviewError::Service(_), .. }));
    assert!(error.to_string().starts_with(&format!("Error processing {}", DOC1)));
    assert_eq!(doc1.calls().batch_writes, 0);
}

/// Without a master URL the run cannot start
#[test]
fn test_run_withoutMasterUrl_shouldFailWithConfigError() {
    let mut config = common::test_config();
    config.master_url = String::new();
    let controller = subreview::Controller::with_parts(
        config,
        std::sync::Arc::new(MemoryBackend::new()),
        std::sync::Arc::new(MockProvider::replying("")),
    );

    let result = tokio_test::block_on(async { controller.run().await });

    assert!(matches!(result, Err(AppError::Config(_))));
}

/// A document with nothing to review is a success with no completion call
#[tokio::test]
async fn test_run_withNothingEligible_shouldNotCallProvider() -> Result<()> {
    let doc1 = common::review_document("doc1", &[("Hello", "こんちは")]);
    let backend = MemoryBackend::new()
        .with_document(MASTER_URL, common::master_index(&[DOC1]))
        .with_document(DOC1, doc1.clone());
    let provider = MockProvider::replying("unused");

    let summary = common::controller(&backend, &provider).run().await?;

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.rows_written, 0);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(doc1.calls().batch_writes, 0);
    Ok(())
}
