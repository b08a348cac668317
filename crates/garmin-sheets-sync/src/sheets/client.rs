//! Google Sheets v4 REST client, limited to what an append-only sync needs:
//! find the worksheet, read column A, append a row.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::sheets::{RowStore, ServiceAccountAuth};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsClient {
    client: Client,
    base_url: String,
    bearer: String,
    spreadsheet_id: String,
    tab: String,
}

impl SheetsClient {
    /// Authenticate and bind to a worksheet. Without an explicit tab the
    /// spreadsheet's first worksheet is used.
    pub async fn connect(
        auth: &ServiceAccountAuth,
        spreadsheet_id: &str,
        tab: Option<String>,
    ) -> Result<Self> {
        let token = auth.access_token().await?;
        let client = Self::new_with_base_url(
            SHEETS_BASE_URL,
            &token.authorization_header(),
            spreadsheet_id,
        )?;
        let tab = match tab {
            Some(tab) => tab,
            None => client.first_sheet_title().await?,
        };
        Ok(client.with_tab(tab))
    }

    /// Create a client against a custom base URL (for testing)
    #[doc(hidden)]
    pub fn new_with_base_url(base_url: &str, bearer: &str, spreadsheet_id: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: bearer.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            tab: String::new(),
        })
    }

    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = tab.into();
        self
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    /// A1 range on the bound worksheet, quoted so any tab title works
    fn range(&self, cells: &str) -> String {
        format!("'{}'!{}", self.tab.replace('\'', "''"), cells)
    }

    fn values_url(&self, cells: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(&self.range(cells))
        )
    }

    pub async fn first_sheet_title(&self) -> Result<String> {
        let response = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties.title")])
            .header(AUTHORIZATION, &self.bearer)
            .send()
            .await?;
        let meta: SpreadsheetMeta = check("read spreadsheet", response).await?.json().await?;

        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| SyncError::sheets("spreadsheet has no worksheets"))
    }
}

#[async_trait]
impl RowStore for SheetsClient {
    async fn first_column(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.values_url("A:A"))
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ])
            .header(AUTHORIZATION, &self.bearer)
            .send()
            .await?;
        let range: ValueRange = check("read rows", response).await?.json().await?;

        Ok(range
            .values
            .iter()
            .map(|row| row.first().map(cell_text).unwrap_or_default())
            .collect())
    }

    async fn append_row(&self, cells: &[Value]) -> Result<()> {
        let url = format!("{}:append", self.values_url("A1"));
        let response = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .header(AUTHORIZATION, &self.bearer)
            .json(&json!({ "majorDimension": "ROWS", "values": [cells] }))
            .send()
            .await?;
        check("append row", response).await?;
        Ok(())
    }
}

async fn check(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::sheets(format!("{} failed ({}): {}", operation, status, body)))
}

/// Cell value as text. Ids written by other tools may come back as
/// numbers; integral numbers lose their fraction so they compare equal
/// to the id strings we write.
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => u.to_string(),
            (_, Some(i), _) => i.to_string(),
            (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < u64::MAX as f64 => {
                format!("{:.0}", f)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        _ => String::new(),
    }
}
