use log::{debug, info};
use std::collections::BTreeMap;

use crate::app_config::ColumnLayout;
use crate::errors::SheetError;
use crate::sheet::{CellWrite, Spreadsheet};
use super::parser::ReviewResult;
use super::prompt::CATCH_ALL_CATEGORY;

/// Cell writes for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Writes in eligible-row order
    pub writes: Vec<CellWrite>,
    /// Rows that received a result
    pub rows: Vec<usize>,
}

impl UpdatePlan {
    /// Whether there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// What happened to the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing to write; no call was made
    NoUpdates,
    /// One bulk write was sent
    Written { rows: usize, cells: usize },
    /// Writes were planned but not sent
    DryRun { rows: usize, cells: usize },
}

/// Whether the explanation column should be written for `category`
pub fn needs_explanation(category: &str) -> bool {
    category.trim().eq_ignore_ascii_case(CATCH_ALL_CATEGORY)
}

/// Plan the writes for every eligible row that has a result
pub fn plan_updates(
    eligible: &[usize],
    results: &BTreeMap<usize, ReviewResult>,
    columns: &ColumnLayout,
) -> UpdatePlan {
    let mut plan = UpdatePlan::default();

    for &row in eligible {
        let Some(result) = results.get(&row) else {
            debug!("No result for row {}, leaving it untouched", row);
            continue;
        };

        plan.writes.push(CellWrite::new(&columns.revised, row, result.revised.clone()));
        plan.writes.push(CellWrite::new(&columns.category, row, result.category.clone()));
        if needs_explanation(&result.category) {
            plan.writes.push(CellWrite::new(&columns.explanation, row, result.explanation.clone()));
        }
        plan.rows.push(row);
    }

    plan
}

/// Send the plan as one bulk write
pub async fn apply_updates(
    sheet: &dyn Spreadsheet,
    sheet_name: &str,
    plan: &UpdatePlan,
) -> Result<UpdateOutcome, SheetError> {
    if plan.is_empty() {
        info!("No updates for {}", sheet.id());
        return Ok(UpdateOutcome::NoUpdates);
    }

    sheet.batch_write(sheet_name, &plan.writes).await?;
    info!(
        "Updated {} rows ({} cells) in {}",
        plan.rows.len(),
        plan.writes.len(),
        sheet.id()
    );

    Ok(UpdateOutcome::Written {
        rows: plan.rows.len(),
        cells: plan.writes.len(),
    })
}
