use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::SheetError;
use super::{
    qualified_range, CellFormat, CellWrite, ColumnFormats, Spreadsheet, SpreadsheetBackend,
};

static SPREADSHEET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").unwrap());

/// Field mask limiting grid reads to the background colour of each cell
const FORMAT_FIELDS: &str =
    "sheets(data(startRow,rowData(values(userEnteredFormat(backgroundColor)))))";

/// Google Sheets client for opening documents by URL
#[derive(Clone)]
pub struct GoogleSheets {
    /// HTTP client for API requests
    client: Client,
    /// API base URL
    endpoint: String,
    /// OAuth bearer token
    access_token: String,
}

/// One Google Sheets document
pub struct GoogleSpreadsheet {
    client: Client,
    endpoint: String,
    access_token: String,
    spreadsheet_id: String,
}

/// Response of `values.get`
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Response of `spreadsheets.get` reduced by `FORMAT_FIELDS`
#[derive(Debug, Default, Deserialize)]
struct GridResponse {
    #[serde(default)]
    sheets: Vec<GridSheet>,
}

#[derive(Debug, Default, Deserialize)]
struct GridSheet {
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    /// 0-based index of the first row covered
    #[serde(default)]
    start_row: usize,
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    #[serde(default)]
    user_entered_format: Option<CellFormat>,
}

/// Body of `values.batchUpdate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<BatchUpdateRange>,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRange {
    range: String,
    values: Vec<Vec<String>>,
}

impl GoogleSheets {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl SpreadsheetBackend for GoogleSheets {
    async fn open_by_url(&self, url: &str) -> Result<Box<dyn Spreadsheet>, SheetError> {
        let spreadsheet_id = spreadsheet_id_from_url(url)?;
        Ok(Box::new(GoogleSpreadsheet {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            access_token: self.access_token.clone(),
            spreadsheet_id,
        }))
    }
}

/// Extract the spreadsheet id from a `docs.google.com/spreadsheets/d/<id>/...` URL
pub fn spreadsheet_id_from_url(url: &str) -> Result<String, SheetError> {
    SPREADSHEET_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| SheetError::InvalidUrl(url.to_string()))
}

/// Map a row block of a grid response onto sheet row numbers
fn collect_column_formats(grid: GridResponse) -> ColumnFormats {
    let mut formats = ColumnFormats::new();
    for data in grid.sheets.into_iter().flat_map(|sheet| sheet.data) {
        for (offset, row) in data.row_data.into_iter().enumerate() {
            let background = row
                .values
                .into_iter()
                .next()
                .and_then(|cell| cell.user_entered_format)
                .and_then(|format| format.background);
            formats.insert(data.start_row + offset + 1, background);
        }
    }
    formats
}

impl GoogleSpreadsheet {
    fn api_url(&self, tail: &[&str]) -> Result<Url, SheetError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| SheetError::InvalidUrl(format!("{}: {}", self.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetError::InvalidUrl(self.endpoint.clone()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("Google Sheets API error ({}): {}", status, message);

        if status.as_u16() == 404 {
            Err(SheetError::NotFound(message))
        } else {
            Err(SheetError::ApiError { status_code: status.as_u16(), message })
        }
    }

    async fn read_formats(&self, range: &str) -> Result<GridResponse, SheetError> {
        let mut url = self.api_url(&[])?;
        url.query_pairs_mut()
            .append_pair("ranges", range)
            .append_pair("fields", FORMAT_FIELDS);

        debug!("Fetching formats for {}", range);
        let response = self.client.get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SheetError::RequestFailed(e.to_string()))?;

        Self::check(response).await?
            .json::<GridResponse>()
            .await
            .map_err(|e| SheetError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Spreadsheet for GoogleSpreadsheet {
    fn id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn read_all_rows(&self, sheet_name: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let range = qualified_range(sheet_name, "A:Z");
        let url = self.api_url(&["values", range.as_str()])?;

        let response = self.client.get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SheetError::RequestFailed(e.to_string()))?;

        let values = Self::check(response).await?
            .json::<ValueRange>()
            .await
            .map_err(|e| SheetError::ParseError(e.to_string()))?;

        Ok(values.values)
    }

    async fn read_column_formats(
        &self,
        sheet_name: &str,
        column: &str,
        first_row: usize,
    ) -> Result<ColumnFormats, SheetError> {
        let column = column.trim().to_ascii_uppercase();
        let range = qualified_range(sheet_name, &format!("{}{}:{}", column, first_row, column));
        let grid = self.read_formats(&range).await?;
        Ok(collect_column_formats(grid))
    }

    async fn read_cell_format(&self, sheet_name: &str, cell: &str) -> Result<CellFormat, SheetError> {
        let range = qualified_range(sheet_name, cell);
        let grid = self.read_formats(&range).await?;
        let background = collect_column_formats(grid).into_values().next().flatten();
        Ok(CellFormat { background })
    }

    async fn batch_write(&self, sheet_name: &str, writes: &[CellWrite]) -> Result<(), SheetError> {
        let body = BatchUpdateRequest {
            value_input_option: "RAW",
            data: writes
                .iter()
                .map(|write| BatchUpdateRange {
                    range: qualified_range(sheet_name, &write.cell),
                    values: vec![vec![write.value.clone()]],
                })
                .collect(),
        };

        let url = self.api_url(&["values:batchUpdate"])?;
        let response = self.client.post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetError::RequestFailed(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}
