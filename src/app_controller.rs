use log::{error, info, warn};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::{AppError, ReviewError};
use crate::providers::{self, Provider};
use crate::review::{CompletionRequester, ReviewPipeline, ReviewReport, UpdateOutcome};
use crate::sheet::google::GoogleSheets;
use crate::sheet::SpreadsheetBackend;

// @module: Application controller for multi-document review runs

/// Totals of a multi-document run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Documents attempted
    pub processed: usize,
    /// Reports of documents that completed
    pub reports: Vec<ReviewReport>,
    /// Failures, one per failed document
    pub failures: Vec<AppError>,
    /// Rows written (or planned, in a dry run) across all documents
    pub rows_written: usize,
}

impl RunSummary {
    /// Number of documents that completed
    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} documents processed: {} succeeded, {} failed, {} rows written",
            self.processed,
            self.succeeded(),
            self.failures.len(),
            self.rows_written
        )
    }
}

/// Main application controller
///
/// Reads the document list from the master index and runs the review
/// pipeline on every document. A failing document is logged and skipped.
pub struct Controller {
    // @field: App configuration
    config: Config,
    backend: Arc<dyn SpreadsheetBackend>,
    pipeline: ReviewPipeline,
}

impl Controller {
    // @method: Create a controller talking to Google Sheets and the configured provider
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        if config.sheets.access_token.is_empty() {
            return Err(AppError::Config(
                "A Google access token is required (sheets.access_token or GOOGLE_ACCESS_TOKEN)".to_string(),
            ));
        }

        let backend = GoogleSheets::new(
            config.sheets.endpoint.clone(),
            config.sheets.access_token.clone(),
            config.sheets.timeout_secs,
        );
        let provider = providers::from_config(&config.completion);

        Ok(Self::with_parts(config, Arc::new(backend), provider))
    }

    /// Create a controller from explicit collaborators
    pub fn with_parts(config: Config, backend: Arc<dyn SpreadsheetBackend>, provider: Arc<dyn Provider>) -> Self {
        let requester = CompletionRequester::from_config(provider, &config.completion);
        let pipeline = ReviewPipeline::new(config.review.clone(), requester);

        Self {
            config,
            backend,
            pipeline,
        }
    }

    /// Document URLs listed in column A of the master index
    pub async fn read_document_urls(&self) -> Result<Vec<String>, AppError> {
        if self.config.master_url.trim().is_empty() {
            return Err(AppError::Config(
                "No master spreadsheet URL configured (master_url or MASTER_SPREADSHEET_URL)".to_string(),
            ));
        }

        let master = self.backend.open_by_url(&self.config.master_url).await?;
        let rows = master.read_all_rows(&self.config.review.master_sheet_name).await?;

        Ok(rows
            .iter()
            .skip(1)
            .filter_map(|row| row.first())
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect())
    }

    /// Review a single document
    pub async fn review_document(&self, url: &str) -> Result<ReviewReport, AppError> {
        info!("Processing: {}", url);

        let document_error = |source: ReviewError| AppError::Document {
            url: url.to_string(),
            source,
        };

        let sheet = self
            .backend
            .open_by_url(url)
            .await
            .map_err(|e| document_error(ReviewError::Open(e)))?;

        self.pipeline.run(sheet.as_ref()).await.map_err(document_error)
    }

    /// Review every document in order, continuing past failures
    pub async fn run_documents(&self, urls: &[String]) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        let progress_bar = ProgressBar::new(urls.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        for url in urls {
            progress_bar.set_message(format!("Processing: {}", url));
            summary.processed += 1;

            match self.review_document(url).await {
                Ok(report) => {
                    summary.rows_written += match report.outcome {
                        UpdateOutcome::Written { rows, .. } | UpdateOutcome::DryRun { rows, .. } => rows,
                        UpdateOutcome::NoUpdates => 0,
                    };
                    if !report.parse_warnings.is_empty() {
                        warn!("{}: {} completion lines skipped", url, report.parse_warnings.len());
                    }
                    summary.reports.push(report);
                }
                Err(e) => {
                    error!("{}", e);
                    summary.failures.push(e);
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("Review complete");
        info!("{} in {}", summary.summary(), Self::format_duration(start_time.elapsed()));

        summary
    }

    /// Review every document listed in the master index
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let urls = self.read_document_urls().await?;
        if urls.is_empty() {
            warn!("The master index lists no documents");
        }
        Ok(self.run_documents(&urls).await)
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
