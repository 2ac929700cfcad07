/*!
 * Translation review pipeline.
 *
 * One document run flows through these stages:
 * - `eligibility`: pick rows whose colour cell is sentinel white
 * - `context`: previous/target/next source lines per row
 * - `prompt`: one consolidated review request
 * - `completion`: call the provider with timeout and retry
 * - `parser`: decode result lines into per-row results
 * - `update`: turn results into one bulk write
 * - `pipeline`: wires the stages together
 *
 * Rows are always addressed by their 1-based sheet row number. The header is
 * row 1, so the first data row is row 2. Only the context extractor works
 * with 0-based data indices; `data_index_to_row` and `row_to_data_index`
 * convert between the two.
 */

use crate::app_config::ColumnLayout;
use crate::errors::SheetError;
use crate::sheet::column_index;

pub mod completion;
pub mod context;
pub mod eligibility;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod update;

pub use self::completion::CompletionRequester;
pub use self::eligibility::{ColorPolicy, EligibilityResolver, FormatStrategy};
pub use self::parser::{parse_response, ParseWarning, ParsedResponse, ReviewResult};
pub use self::pipeline::{ReviewPipeline, ReviewReport};
pub use self::prompt::PromptBuilder;
pub use self::update::{plan_updates, apply_updates, UpdateOutcome, UpdatePlan};

/// Sheet row number of the first data row
pub const FIRST_DATA_ROW: usize = 2;

/// Sheet row number of the 0-based data index `index`
pub fn data_index_to_row(index: usize) -> usize {
    index + FIRST_DATA_ROW
}

/// 0-based data index of a sheet row, `None` for the header or row 0
pub fn row_to_data_index(row: usize) -> Option<usize> {
    row.checked_sub(FIRST_DATA_ROW)
}

/// One data row of the review worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// 1-based sheet row number
    pub row_number: usize,
    /// Source transcript line
    pub source_text: String,
    /// First-pass machine translation
    pub first_pass_translation: String,
    /// Revised translation, empty until reviewed
    pub revised_translation: String,
    /// Error category, empty until reviewed
    pub error_category: String,
    /// Explanation for the catch-all category
    pub error_explanation: String,
    /// Current value of the guard column
    pub guard_text: String,
}

/// Column layout resolved to 0-based indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndexes {
    source: usize,
    first_pass: usize,
    revised: usize,
    category: usize,
    explanation: usize,
    guard: usize,
}

impl ColumnIndexes {
    /// Resolve every column letter of `layout`
    pub fn from_layout(layout: &ColumnLayout) -> Result<Self, SheetError> {
        Ok(Self {
            source: column_index(&layout.source)?,
            first_pass: column_index(&layout.first_pass)?,
            revised: column_index(&layout.revised)?,
            category: column_index(&layout.category)?,
            explanation: column_index(&layout.explanation)?,
            guard: column_index(&layout.guard)?,
        })
    }
}

impl Row {
    /// Build a row from raw cell values; missing cells read as empty
    pub fn from_values(row_number: usize, values: &[String], columns: &ColumnIndexes) -> Self {
        let cell = |index: usize| values.get(index).cloned().unwrap_or_default();
        Self {
            row_number,
            source_text: cell(columns.source),
            first_pass_translation: cell(columns.first_pass),
            revised_translation: cell(columns.revised),
            error_category: cell(columns.category),
            error_explanation: cell(columns.explanation),
            guard_text: cell(columns.guard),
        }
    }
}

/// Convert a full worksheet read (header included) into data rows
pub fn rows_from_values(values: &[Vec<String>], columns: &ColumnIndexes) -> Vec<Row> {
    values
        .iter()
        .skip(1)
        .enumerate()
        .map(|(index, cells)| Row::from_values(data_index_to_row(index), cells, columns))
        .collect()
}
