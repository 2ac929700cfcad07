use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::app_config::ReviewConfig;
use crate::errors::ReviewError;
use crate::sheet::Spreadsheet;
use super::completion::CompletionRequester;
use super::eligibility::EligibilityResolver;
use super::parser::{parse_response, ParseWarning, ReviewResult};
use super::prompt::{collect_items, PromptBuilder};
use super::update::{apply_updates, plan_updates, UpdateOutcome};
use super::{rows_from_values, ColumnIndexes};

/// Summary of one document run
#[derive(Debug, Clone)]
pub struct ReviewReport {
    /// Document identifier
    pub document: String,
    /// Number of data rows read
    pub data_rows: usize,
    /// Eligible sheet row numbers
    pub eligible: Vec<usize>,
    /// Parsed results, including rows that were not eligible
    pub results: BTreeMap<usize, ReviewResult>,
    /// Skipped completion lines
    pub parse_warnings: Vec<ParseWarning>,
    /// Rows that received writes (or would have, in a dry run)
    pub written_rows: Vec<usize>,
    /// Outcome of the write stage
    pub outcome: UpdateOutcome,
}

impl ReviewReport {
    fn empty(document: &str, data_rows: usize) -> Self {
        Self {
            document: document.to_string(),
            data_rows,
            eligible: Vec::new(),
            results: BTreeMap::new(),
            parse_warnings: Vec::new(),
            written_rows: Vec::new(),
            outcome: UpdateOutcome::NoUpdates,
        }
    }
}

/// Runs the review of one opened document
#[derive(Debug, Clone)]
pub struct ReviewPipeline {
    config: ReviewConfig,
    resolver: EligibilityResolver,
    prompt_builder: PromptBuilder,
    requester: CompletionRequester,
}

impl ReviewPipeline {
    /// Create a pipeline from review settings and a completion requester
    pub fn new(config: ReviewConfig, requester: CompletionRequester) -> Self {
        let resolver = EligibilityResolver::from_config(&config);
        let prompt_builder = PromptBuilder::new(config.row_marker.clone())
            .include_taxonomy(config.include_taxonomy);

        Self {
            config,
            resolver,
            prompt_builder,
            requester,
        }
    }

    /// Review every eligible row of `sheet`
    pub async fn run(&self, sheet: &dyn Spreadsheet) -> Result<ReviewReport, ReviewError> {
        let sheet_name = self.config.sheet_name.as_str();
        let columns = ColumnIndexes::from_layout(&self.config.columns).map_err(ReviewError::InvalidLayout)?;

        let values = sheet.read_all_rows(sheet_name).await.map_err(ReviewError::ReadRows)?;
        let rows = rows_from_values(&values, &columns);
        debug!("Read {} data rows from {}", rows.len(), sheet.id());

        let eligible = self.resolver.resolve(sheet, sheet_name, &rows).await?;
        if eligible.is_empty() {
            info!("No eligible rows in {}", sheet.id());
            return Ok(ReviewReport::empty(sheet.id(), rows.len()));
        }
        info!("{} of {} rows eligible for review in {}", eligible.len(), rows.len(), sheet.id());

        let prompt = self.prompt_builder.build(&collect_items(&rows, &eligible));
        self.trace("Prompt", &prompt);

        let completion = self.requester.request(&prompt).await?;
        self.trace("Completion", &completion);

        let parsed = parse_response(&completion, &self.config.row_marker);
        let missing = eligible.iter().filter(|row| !parsed.results.contains_key(row)).count();
        if missing > 0 {
            warn!("{} eligible rows got no result in {}", missing, sheet.id());
        }

        let plan = plan_updates(&eligible, &parsed.results, &self.config.columns);
        let outcome = if self.config.dry_run && !plan.is_empty() {
            for write in &plan.writes {
                info!("[dry run] {}!{} = {}", sheet_name, write.cell, write.value);
            }
            UpdateOutcome::DryRun {
                rows: plan.rows.len(),
                cells: plan.writes.len(),
            }
        } else {
            apply_updates(sheet, sheet_name, &plan).await.map_err(ReviewError::Write)?
        };

        Ok(ReviewReport {
            document: sheet.id().to_string(),
            data_rows: rows.len(),
            eligible,
            results: parsed.results,
            parse_warnings: parsed.warnings,
            written_rows: plan.rows,
            outcome,
        })
    }

    fn trace(&self, label: &str, text: &str) {
        if self.config.debug {
            info!("{}:\n{}", label, text);
        } else {
            debug!("{}:\n{}", label, text);
        }
    }
}
