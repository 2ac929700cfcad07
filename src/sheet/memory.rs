/*!
 * In-memory spreadsheet implementation.
 *
 * Holds worksheets as plain string grids plus explicitly recorded background
 * colours. Handles are cheap clones sharing one document, so a test can keep
 * a handle, give another to the pipeline, and inspect the result afterwards.
 * Failures can be injected per operation to exercise error paths.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::SheetError;
use super::{
    parse_cell, CellFormat, CellWrite, Color, ColumnFormats, Spreadsheet, SpreadsheetBackend,
    column_index,
};

/// Operation that can be made to fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `read_all_rows`
    ReadRows,
    /// `read_column_formats`
    ColumnFormats,
    /// `read_cell_format` for one cell address
    CellFormat(String),
    /// `batch_write`
    BatchWrite,
}

/// Counters of calls made against a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Number of `read_all_rows` calls
    pub read_rows: usize,
    /// Number of bulk format reads
    pub column_formats: usize,
    /// Number of per-cell format probes
    pub cell_formats: usize,
    /// Number of bulk writes
    pub batch_writes: usize,
}

#[derive(Debug, Default)]
struct Worksheet {
    rows: Vec<Vec<String>>,
    backgrounds: HashMap<(usize, usize), Color>,
}

#[derive(Debug, Default)]
struct DocumentState {
    sheets: HashMap<String, Worksheet>,
    failures: HashSet<FailPoint>,
    calls: CallCounts,
    last_batch: Vec<CellWrite>,
}

/// Shared handle to one in-memory spreadsheet
#[derive(Debug, Clone)]
pub struct MemorySpreadsheet {
    id: String,
    state: Arc<Mutex<DocumentState>>,
}

impl MemorySpreadsheet {
    /// Create an empty document
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(DocumentState::default())),
        }
    }

    /// Replace a worksheet's rows, header included
    pub fn with_rows<R, C>(self, sheet_name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.state.lock().sheets.entry(sheet_name.to_string()).or_default().rows = rows;
        self
    }

    /// Record an explicit background colour for a cell
    pub fn with_background(self, sheet_name: &str, cell: &str, color: Color) -> Self {
        self.set_background(sheet_name, cell, color);
        self
    }

    /// Make an operation fail on every call
    pub fn failing_on(self, point: FailPoint) -> Self {
        self.state.lock().failures.insert(point);
        self
    }

    /// Record an explicit background colour for a cell
    pub fn set_background(&self, sheet_name: &str, cell: &str, color: Color) {
        if let Ok(key) = parse_cell(cell) {
            self.state
                .lock()
                .sheets
                .entry(sheet_name.to_string())
                .or_default()
                .backgrounds
                .insert(key, color);
        }
    }

    /// Value of a cell, empty if unset
    pub fn cell(&self, sheet_name: &str, cell: &str) -> String {
        let Ok((column, row)) = parse_cell(cell) else {
            return String::new();
        };
        let state = self.state.lock();
        state
            .sheets
            .get(sheet_name)
            .and_then(|sheet| sheet.rows.get(row - 1))
            .and_then(|values| values.get(column))
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of a worksheet's rows
    pub fn rows(&self, sheet_name: &str) -> Vec<Vec<String>> {
        self.state
            .lock()
            .sheets
            .get(sheet_name)
            .map(|sheet| sheet.rows.clone())
            .unwrap_or_default()
    }

    /// Calls made so far
    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// Writes submitted by the most recent `batch_write`
    pub fn last_batch(&self) -> Vec<CellWrite> {
        self.state.lock().last_batch.clone()
    }

    fn check(state: &DocumentState, point: FailPoint) -> Result<(), SheetError> {
        if state.failures.contains(&point) {
            return Err(SheetError::RequestFailed(format!("Simulated failure: {:?}", point)));
        }
        Ok(())
    }
}

#[async_trait]
impl Spreadsheet for MemorySpreadsheet {
    fn id(&self) -> &str {
        &self.id
    }

    async fn read_all_rows(&self, sheet_name: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let mut state = self.state.lock();
        state.calls.read_rows += 1;
        Self::check(&state, FailPoint::ReadRows)?;

        state
            .sheets
            .get(sheet_name)
            .map(|sheet| sheet.rows.clone())
            .ok_or_else(|| SheetError::NotFound(format!("worksheet '{}'", sheet_name)))
    }

    async fn read_column_formats(
        &self,
        sheet_name: &str,
        column: &str,
        first_row: usize,
    ) -> Result<ColumnFormats, SheetError> {
        let column = column_index(column)?;
        let mut state = self.state.lock();
        state.calls.column_formats += 1;
        Self::check(&state, FailPoint::ColumnFormats)?;

        let sheet = state
            .sheets
            .get(sheet_name)
            .ok_or_else(|| SheetError::NotFound(format!("worksheet '{}'", sheet_name)))?;

        Ok(sheet
            .backgrounds
            .iter()
            .filter(|((col, row), _)| *col == column && *row >= first_row)
            .map(|((_, row), color)| (*row, Some(*color)))
            .collect())
    }

    async fn read_cell_format(&self, sheet_name: &str, cell: &str) -> Result<CellFormat, SheetError> {
        let key = parse_cell(cell)?;
        let mut state = self.state.lock();
        state.calls.cell_formats += 1;
        Self::check(&state, FailPoint::CellFormat(cell.to_string()))?;

        let sheet = state
            .sheets
            .get(sheet_name)
            .ok_or_else(|| SheetError::NotFound(format!("worksheet '{}'", sheet_name)))?;

        Ok(CellFormat {
            background: sheet.backgrounds.get(&key).copied(),
        })
    }

    async fn batch_write(&self, sheet_name: &str, writes: &[CellWrite]) -> Result<(), SheetError> {
        let parsed = writes
            .iter()
            .map(|write| parse_cell(&write.cell).map(|key| (key, write.value.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.state.lock();
        state.calls.batch_writes += 1;
        Self::check(&state, FailPoint::BatchWrite)?;

        let sheet = state
            .sheets
            .get_mut(sheet_name)
            .ok_or_else(|| SheetError::NotFound(format!("worksheet '{}'", sheet_name)))?;

        for ((column, row), value) in parsed {
            if sheet.rows.len() < row {
                sheet.rows.resize_with(row, Vec::new);
            }
            let cells = &mut sheet.rows[row - 1];
            if cells.len() <= column {
                cells.resize(column + 1, String::new());
            }
            cells[column] = value;
        }

        state.last_batch = writes.to_vec();
        Ok(())
    }
}

/// Backend resolving URLs to registered in-memory documents
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<Mutex<HashMap<String, MemorySpreadsheet>>>,
}

impl MemoryBackend {
    /// Create a backend with no documents
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `url`
    pub fn insert(&self, url: impl Into<String>, document: MemorySpreadsheet) {
        self.documents.lock().insert(url.into(), document);
    }

    /// Builder form of `insert`
    pub fn with_document(self, url: impl Into<String>, document: MemorySpreadsheet) -> Self {
        self.insert(url, document);
        self
    }
}

#[async_trait]
impl SpreadsheetBackend for MemoryBackend {
    async fn open_by_url(&self, url: &str) -> Result<Box<dyn Spreadsheet>, SheetError> {
        self.documents
            .lock()
            .get(url)
            .cloned()
            .map(|document| Box::new(document) as Box<dyn Spreadsheet>)
            .ok_or_else(|| SheetError::NotFound(format!("document {}", url)))
    }
}
