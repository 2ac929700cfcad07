/*!
 * Common test utilities for the subreview test suite
 */

use std::sync::Arc;

use subreview::app_config::Config;
use subreview::providers::mock::MockProvider;
use subreview::review::{CompletionRequester, ReviewPipeline};
use subreview::sheet::memory::{MemoryBackend, MemorySpreadsheet};
use subreview::sheet::Color;
use subreview::Controller;

/// Header row of the review worksheet
pub const HEADER: [&str; 5] = ["source", "first pass", "revised", "category", "explanation"];

/// Worksheet reviewed by default
pub const TASK_SHEET: &str = "Task";

/// URL of the in-memory master index
pub const MASTER_URL: &str = "https://docs.google.com/spreadsheets/d/master/edit";

/// Install a test logger once; repeated calls are ignored
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A document whose `Task` sheet holds `lines` as (source, first pass) pairs
pub fn review_document(id: &str, lines: &[(&str, &str)]) -> MemorySpreadsheet {
    let mut rows = vec![HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    rows.extend(
        lines
            .iter()
            .map(|(source, first_pass)| vec![source.to_string(), first_pass.to_string()]),
    );
    MemorySpreadsheet::new(id).with_rows(TASK_SHEET, rows)
}

/// Mark `rows` as needing review by giving their colour cell a white background
pub fn mark_white(document: MemorySpreadsheet, rows: &[usize]) -> MemorySpreadsheet {
    for row in rows {
        document.set_background(TASK_SHEET, &format!("C{}", row), Color::white());
    }
    document
}

/// A master index listing `urls` in column A under a header
pub fn master_index(urls: &[&str]) -> MemorySpreadsheet {
    let mut rows = vec![vec!["url".to_string()]];
    rows.extend(urls.iter().map(|url| vec![url.to_string()]));
    MemorySpreadsheet::new("master").with_rows("Sheet1", rows)
}

/// Default config with the fields a run needs
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.master_url = MASTER_URL.to_string();
    config.completion.api_key = "test-key".to_string();
    config.completion.retry_count = 0;
    config
}

/// Pipeline over `provider` with default review settings
pub fn pipeline(provider: &MockProvider) -> ReviewPipeline {
    let config = test_config();
    let requester = CompletionRequester::from_config(Arc::new(provider.clone()), &config.completion);
    ReviewPipeline::new(config.review, requester)
}

/// Controller over in-memory documents
pub fn controller(backend: &MemoryBackend, provider: &MockProvider) -> Controller {
    Controller::with_parts(test_config(), Arc::new(backend.clone()), Arc::new(provider.clone()))
}
