/*!
 * Spreadsheet access for the review pipeline.
 *
 * The pipeline only ever sees the `Spreadsheet` trait: a grid store with
 * row reads, background-colour metadata reads and a bulk value write.
 * Implementations:
 * - `google`: Google Sheets REST v4 over reqwest
 * - `memory`: in-process grid used by tests and local experiments
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::SheetError;

pub mod google;
pub mod memory;

/// Hex form of the background colour that marks a row for review
pub const SENTINEL_WHITE: &str = "#FFFFFF";

/// RGB background colour with channels in `[0, 1]`
///
/// A channel that is not recorded counts as fully saturated, so an empty
/// colour object normalises to white.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<f32>,
    /// Green channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<f32>,
    /// Blue channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<f32>,
}

impl Color {
    /// Build a colour with every channel set
    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red: Some(red),
            green: Some(green),
            blue: Some(blue),
        }
    }

    /// Pure white
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Whether any channel is recorded at all
    pub fn has_channels(&self) -> bool {
        self.red.is_some() || self.green.is_some() || self.blue.is_some()
    }

    /// Normalise to an uppercase `#RRGGBB` string
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            channel_to_byte(self.red),
            channel_to_byte(self.green),
            channel_to_byte(self.blue)
        )
    }

    /// Whether this colour is exactly the review sentinel
    pub fn is_sentinel_white(&self) -> bool {
        self.to_hex() == SENTINEL_WHITE
    }
}

fn channel_to_byte(channel: Option<f32>) -> u8 {
    let value = channel.unwrap_or(1.0).clamp(0.0, 1.0);
    (value * 255.0).round() as u8
}

/// User-entered format of a single cell, reduced to what eligibility needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    /// Explicit background colour, if one was recorded
    #[serde(default, rename = "backgroundColor")]
    pub background: Option<Color>,
}

/// One single-cell value write, addressed in A1 notation without a sheet name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    /// Cell address such as `C2`
    pub cell: String,
    /// Value to store
    pub value: String,
}

impl CellWrite {
    /// Create a write for `column` at sheet row `row`
    pub fn new(column: &str, row: usize, value: impl Into<String>) -> Self {
        Self {
            cell: cell_address(column, row),
            value: value.into(),
        }
    }
}

/// Sparse map from sheet row number to the recorded background colour
pub type ColumnFormats = HashMap<usize, Option<Color>>;

/// One opened spreadsheet document
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Identifier of the document (spreadsheet id or test name)
    fn id(&self) -> &str;

    /// Read every row of a worksheet, header included
    async fn read_all_rows(&self, sheet_name: &str) -> Result<Vec<Vec<String>>, SheetError>;

    /// Read background colours for a whole column in one call
    ///
    /// Rows from `first_row` downward are covered. Rows without explicit
    /// formatting are either absent from the map or mapped to `None`.
    async fn read_column_formats(
        &self,
        sheet_name: &str,
        column: &str,
        first_row: usize,
    ) -> Result<ColumnFormats, SheetError>;

    /// Read the format of a single cell
    async fn read_cell_format(&self, sheet_name: &str, cell: &str) -> Result<CellFormat, SheetError>;

    /// Apply all writes as one bulk operation
    async fn batch_write(&self, sheet_name: &str, writes: &[CellWrite]) -> Result<(), SheetError>;
}

/// Opens spreadsheet documents by URL
#[async_trait]
pub trait SpreadsheetBackend: Send + Sync {
    /// Open the document behind `url`
    async fn open_by_url(&self, url: &str) -> Result<Box<dyn Spreadsheet>, SheetError>;
}

/// Convert a column letter (`A`, `C`, `AA`) to a 0-based index
pub fn column_index(column: &str) -> Result<usize, SheetError> {
    let column = column.trim();
    if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SheetError::InvalidAddress(column.to_string()));
    }

    let index = column
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .try_fold(0usize, |acc, c| {
            acc.checked_mul(26)?.checked_add(c as usize - 'A' as usize + 1)
        })
        .ok_or_else(|| SheetError::InvalidAddress(column.to_string()))?;

    Ok(index - 1)
}

/// A1 address for `column` at sheet row `row`
pub fn cell_address(column: &str, row: usize) -> String {
    format!("{}{}", column.trim().to_ascii_uppercase(), row)
}

/// Split an A1 cell address into a 0-based column index and a sheet row number
pub fn parse_cell(cell: &str) -> Result<(usize, usize), SheetError> {
    let cell = cell.trim();
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| SheetError::InvalidAddress(cell.to_string()))?;
    let (letters, digits) = cell.split_at(split);

    let column = column_index(letters)?;
    let row = digits
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .ok_or_else(|| SheetError::InvalidAddress(cell.to_string()))?;

    Ok((column, row))
}

/// Prefix a range with a quoted worksheet name (`'Task'!C2`)
pub fn qualified_range(sheet_name: &str, range: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), range)
}
