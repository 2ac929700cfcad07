/*!
 * Colour-based row eligibility.
 *
 * Editors mark rows that need review by giving the colour cell a pure white
 * background. Whether a row qualifies depends on the colour policy, on the
 * optional output-column guard, and on how colours are fetched.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::ReviewConfig;
use crate::errors::ReviewError;
use crate::sheet::{cell_address, Color, Spreadsheet};
use super::{Row, FIRST_DATA_ROW};

/// How a recorded (or missing) background colour decides eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Only an explicitly recorded white background qualifies
    #[default]
    StrictExplicit,
    /// A missing background renders white, so it qualifies too
    DefaultWhite,
}

impl ColorPolicy {
    /// Whether a cell with this background passes the colour gate
    ///
    /// A colour object without any channel is treated as no colour at all.
    pub fn admits(&self, background: Option<&Color>) -> bool {
        let explicit = background.filter(|color| color.has_channels());
        match (self, explicit) {
            (_, Some(color)) => color.is_sentinel_white(),
            (Self::StrictExplicit, None) => false,
            (Self::DefaultWhite, None) => true,
        }
    }
}

/// How background colours are read from the spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatStrategy {
    /// One metadata read for the whole colour column
    #[default]
    Bulk,
    /// One read per row, spaced by a fixed delay
    PerCell,
}

/// Decides which data rows are reviewed this run
#[derive(Debug, Clone)]
pub struct EligibilityResolver {
    policy: ColorPolicy,
    strategy: FormatStrategy,
    require_empty_output: bool,
    color_column: String,
    probe_delay: Duration,
}

impl EligibilityResolver {
    /// Create a resolver
    pub fn new(policy: ColorPolicy, strategy: FormatStrategy, color_column: impl Into<String>) -> Self {
        Self {
            policy,
            strategy,
            require_empty_output: true,
            color_column: color_column.into(),
            probe_delay: Duration::ZERO,
        }
    }

    /// Create a resolver from review settings
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self::new(config.policy, config.strategy, config.columns.color.clone())
            .require_empty_output(config.require_empty_output)
            .probe_delay(Duration::from_millis(config.probe_delay_ms))
    }

    /// Toggle the output-column guard
    pub fn require_empty_output(mut self, enabled: bool) -> Self {
        self.require_empty_output = enabled;
        self
    }

    /// Set the pause between per-cell probes
    pub fn probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    fn passes_guard(&self, row: &Row) -> bool {
        !self.require_empty_output || row.guard_text.trim().is_empty()
    }

    /// Decide eligibility of one row given its colour cell background
    pub fn is_eligible(&self, row: &Row, background: Option<&Color>) -> bool {
        self.passes_guard(row) && self.policy.admits(background)
    }

    /// Sheet row numbers of all eligible rows, ascending
    pub async fn resolve(
        &self,
        sheet: &dyn Spreadsheet,
        sheet_name: &str,
        rows: &[Row],
    ) -> Result<Vec<usize>, ReviewError> {
        let eligible = match self.strategy {
            FormatStrategy::Bulk => self.resolve_bulk(sheet, sheet_name, rows).await?,
            FormatStrategy::PerCell => self.resolve_per_cell(sheet, sheet_name, rows).await,
        };

        debug!(
            "{} of {} rows eligible ({:?}, {:?})",
            eligible.len(),
            rows.len(),
            self.policy,
            self.strategy
        );
        Ok(eligible)
    }

    async fn resolve_bulk(
        &self,
        sheet: &dyn Spreadsheet,
        sheet_name: &str,
        rows: &[Row],
    ) -> Result<Vec<usize>, ReviewError> {
        let formats = sheet
            .read_column_formats(sheet_name, &self.color_column, FIRST_DATA_ROW)
            .await
            .map_err(ReviewError::FormatFetch)?;

        Ok(rows
            .iter()
            .filter(|row| {
                let background = formats.get(&row.row_number).and_then(Option::as_ref);
                self.is_eligible(row, background)
            })
            .map(|row| row.row_number)
            .collect())
    }

    async fn resolve_per_cell(&self, sheet: &dyn Spreadsheet, sheet_name: &str, rows: &[Row]) -> Vec<usize> {
        let mut eligible = Vec::new();
        let mut probed = false;

        for row in rows {
            // No probe needed when the guard already excludes the row
            if !self.passes_guard(row) {
                continue;
            }

            if probed && !self.probe_delay.is_zero() {
                tokio::time::sleep(self.probe_delay).await;
            }
            probed = true;

            let cell = cell_address(&self.color_column, row.row_number);
            match sheet.read_cell_format(sheet_name, &cell).await {
                Ok(format) => {
                    if self.policy.admits(format.background.as_ref()) {
                        eligible.push(row.row_number);
                    }
                }
                Err(e) => warn!("Skipping row {}: format fetch for {} failed: {}", row.row_number, cell, e),
            }
        }

        eligible
    }
}
