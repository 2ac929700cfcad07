/*!
 * Review prompt construction.
 *
 * All eligible rows go into a single request. The request starts with a fixed
 * instruction header, optionally lists the closed error taxonomy, spells out
 * the result-line grammar, and then carries one block per row separated by
 * `BLOCK_DELIMITER` lines.
 */

use super::context::{extract_context, LineContext};
use super::{row_to_data_index, Row};

/// Closed error taxonomy; the last label is the catch-all
pub const ERROR_CATEGORIES: [&str; 8] = [
    "No Error",
    "Minor Error - Unnatural Phrasing",
    "Minor Error - Style",
    "Major Error - Mistranslation",
    "Major Error - Omission",
    "Major Error - Addition",
    "Major Error - Terminology",
    "Other",
];

/// Label that requires an explanation
pub const CATCH_ALL_CATEGORY: &str = "Other";

/// Line separating row blocks
pub const BLOCK_DELIMITER: &str = "---";

const INSTRUCTIONS: &str = "The rows below come from a transcript of spoken English that contains colloquial expressions, \
each with a first-pass Japanese translation.
Review the translation of each target line. Use the previous and next lines as context and improve the accuracy of the translation.

For every row, return:
1. A corrected translation (one line)
2. An error category for the first-pass translation
3. A short reason in English, only when the category is \"Other\"; otherwise leave it empty";

/// One row as presented to the reviewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    /// Sheet row number
    pub row_number: usize,
    /// Surrounding source lines
    pub context: LineContext,
    /// First-pass translation of the target line
    pub first_pass: String,
}

/// Collect review items for the eligible rows, in eligible order
///
/// Row numbers that do not address a data row are dropped.
pub fn collect_items(rows: &[Row], eligible: &[usize]) -> Vec<ReviewItem> {
    eligible
        .iter()
        .filter_map(|&row_number| {
            let index = row_to_data_index(row_number)?;
            let row = rows.get(index)?;
            Some(ReviewItem {
                row_number,
                context: extract_context(rows, index),
                first_pass: row.first_pass_translation.clone(),
            })
        })
        .collect()
}

/// Builds the consolidated review prompt
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    marker: String,
    include_taxonomy: bool,
}

impl PromptBuilder {
    /// Create a builder using `marker` as the result-line prefix
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            include_taxonomy: true,
        }
    }

    /// Include or omit the error taxonomy
    pub fn include_taxonomy(mut self, include: bool) -> Self {
        self.include_taxonomy = include;
        self
    }

    /// The grammar line every result must follow
    pub fn result_line_format(&self) -> String {
        format!(
            "{} <row number>: <corrected translation> | <error category> | <explanation>",
            self.marker
        )
    }

    /// Build one prompt covering every item
    pub fn build(&self, items: &[ReviewItem]) -> String {
        let mut prompt = String::from(INSTRUCTIONS);
        prompt.push_str("\n\n");

        if self.include_taxonomy {
            prompt.push_str("Choose the error category from exactly this list:\n");
            for category in ERROR_CATEGORIES {
                prompt.push_str(&format!("- {}\n", category));
            }
            prompt.push('\n');
        }

        prompt.push_str("Answer with exactly one line per row, in this format and nothing else:\n");
        prompt.push_str(&self.result_line_format());
        prompt.push_str("\nLeave <explanation> empty unless the category is \"");
        prompt.push_str(CATCH_ALL_CATEGORY);
        prompt.push_str("\", but keep both '|' separators.\n");

        for item in items {
            prompt.push('\n');
            prompt.push_str(BLOCK_DELIMITER);
            prompt.push('\n');
            prompt.push_str(&format!("Row {}\n", item.row_number));
            prompt.push_str(&format!("Previous: {}\n", one_line(&item.context.prev)));
            prompt.push_str(&format!("Target: {}\n", one_line(&item.context.target)));
            prompt.push_str(&format!("Next: {}\n", one_line(&item.context.next)));
            prompt.push_str(&format!("First-pass translation: {}\n", one_line(&item.first_pass)));
        }

        if !items.is_empty() {
            prompt.push_str(BLOCK_DELIMITER);
            prompt.push('\n');
        }

        prompt
    }
}

/// Cell values may span lines; blocks are line-oriented
fn one_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
