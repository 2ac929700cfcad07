/*!
 * Integration tests for reviewing one document end to end
 */

use anyhow::Result;
use std::collections::BTreeMap;

use subreview::app_config::ColumnLayout;
use subreview::providers::mock::MockProvider;
use subreview::review::{apply_updates, parse_response, plan_updates, ReviewResult, UpdateOutcome};

use crate::common;

/// The documented single-row scenario writes the revised and category cells only
#[tokio::test]
async fn test_review_helloScenario_shouldWriteC2AndD2Only() -> Result<()> {
    common::init_logger();
    let document = common::mark_white(common::review_document("hello", &[("Hello", "こんちは")]), &[2]);
    let provider = MockProvider::replying("行 2: こんにちは | Minor Error - Unnatural Phrasing | ");

    let report = common::pipeline(&provider).run(&document).await?;

    assert_eq!(report.eligible, vec![2]);
    assert_eq!(report.results[&2], ReviewResult {
        revised: "こんにちは".to_string(),
        category: "Minor Error - Unnatural Phrasing".to_string(),
        explanation: String::new(),
    });

    let written: Vec<String> = document.last_batch().into_iter().map(|w| w.cell).collect();
    assert_eq!(written, vec!["C2", "D2"]);
    assert_eq!(document.cell("Task", "C2"), "こんにちは");
    assert_eq!(document.cell("Task", "E2"), "");
    assert_eq!(provider.request_count(), 1);
    Ok(())
}

/// A filled category column keeps a white row out of the review
#[tokio::test]
async fn test_review_withReviewedRow_shouldSkipIt() -> Result<()> {
    let document = common::mark_white(
        common::review_document("partial", &[("Hello", "こんちは"), ("Bye", "さよなら")]),
        &[2, 3],
    );
    let provider = MockProvider::replying("行 3: さようなら | No Error |");

    // row 2 was reviewed in an earlier run
    let first = common::pipeline(&MockProvider::replying("行 2: こんにちは | Other | greeting"))
        .run(&document)
        .await?;
    assert_eq!(first.written_rows, vec![2]);

    let report = common::pipeline(&provider).run(&document).await?;

    assert_eq!(report.eligible, vec![3]);
    assert_eq!(document.cell("Task", "E2"), "greeting");
    assert_eq!(document.cell("Task", "C3"), "さようなら");
    Ok(())
}

/// Rows with neighbours carry them into the prompt
#[tokio::test]
async fn test_review_prompt_shouldCarryContextForEachEligibleRow() -> Result<()> {
    let document = common::mark_white(
        common::review_document("context", &[("one", "一"), ("two", "二"), ("three", "三")]),
        &[2, 4],
    );
    let provider = MockProvider::replying("");

    let report = common::pipeline(&provider).run(&document).await?;

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("Row 2\nPrevious: \nTarget: one\nNext: two\nFirst-pass translation: 一\n"));
    assert!(prompt.contains("Row 4\nPrevious: two\nTarget: three\nNext: \nFirst-pass translation: 三\n"));
    assert_eq!(report.outcome, UpdateOutcome::NoUpdates);
    Ok(())
}

/// A completion with one malformed line still applies the others
#[tokio::test]
async fn test_review_withMalformedLine_shouldApplyTheRest() -> Result<()> {
    let lines = [("a", "あ"), ("b", "び"), ("c", "し"), ("d", "で")];
    let document = common::mark_white(common::review_document("four", &lines), &[2, 3, 4, 5]);
    let provider = MockProvider::replying(
        "行 2: ア | No Error |\n行 3 ビ | No Error |\n行 4: シ | Major Error - Mistranslation |\n行 5: デ | other | tone",
    );

    let report = common::pipeline(&provider).run(&document).await?;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.parse_warnings.len(), 1);
    assert_eq!(report.written_rows, vec![2, 4, 5]);
    assert_eq!(document.cell("Task", "C3"), "");
    assert_eq!(document.cell("Task", "E5"), "tone");
    Ok(())
}

/// Three good lines and one missing its colon give three results
#[test]
fn test_parseResponse_withThreeGoodAndOneBad_shouldKeepThree() {
    let text = "行 2: ア | No Error |\n行 3: イ | Minor Error - Style |\n行 4 ウ | No Error |\n行 5: エ | Other | why";

    let parsed = parse_response(text, "行");

    assert_eq!(parsed.results.len(), 3);
    assert_eq!(parsed.warnings.len(), 1);
}

/// Applying the same results twice leaves the same cell values
#[tokio::test]
async fn test_applyUpdates_twice_shouldLeaveSameValues() -> Result<()> {
    let document = common::review_document("idem", &[("Hello", "こんちは"), ("Bye", "さよなら")]);
    let mut results = BTreeMap::new();
    results.insert(2, ReviewResult {
        revised: "こんにちは".to_string(),
        category: "Other".to_string(),
        explanation: "greeting".to_string(),
    });
    results.insert(3, ReviewResult {
        revised: "さようなら".to_string(),
        category: "No Error".to_string(),
        explanation: String::new(),
    });
    let plan = plan_updates(&[2, 3], &results, &ColumnLayout::default());

    apply_updates(&document, "Task", &plan).await?;
    let once = document.rows("Task");
    apply_updates(&document, "Task", &plan).await?;

    assert_eq!(document.rows("Task"), once);
    Ok(())
}
