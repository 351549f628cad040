//! Google Sheets Values API client.
//!
//! Issues `GET {base}/v4/spreadsheets/{id}/values/{table}?key=...` and
//! decodes the `values` array into string rows.

use super::{SourceError, Table, TableSource};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Connection settings for the Sheets API.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub api_key: String,
}

/// Body of a `spreadsheets.values.get` response.
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<Value>>>,
}

/// [`TableSource`] backed by the Google Sheets Values API.
pub struct GoogleSheetsSource {
    config: SheetsConfig,
    http_client: reqwest::Client,
}

impl GoogleSheetsSource {
    /// Build a client. No request timeout is set: a hung table keeps
    /// the fetch cycle outstanding.
    pub fn new(config: SheetsConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build the values endpoint for one table, percent-encoding segments.
    fn values_url(&self, table_id: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|_| SourceError::InvalidUrl(self.config.base_url.clone()))?;

        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                table_id,
            ]);

        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }
}

#[async_trait]
impl TableSource for GoogleSheetsSource {
    async fn fetch_table(&self, table_id: &str) -> Result<Table, SourceError> {
        let url = self.values_url(table_id)?;
        debug!("Fetching table {} from {}", table_id, url.path());

        let http_error = |source| SourceError::Http {
            table: table_id.to_string(),
            source,
        };

        let response = self.http_client.get(url).send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                table: table_id.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(http_error)?;
        let table = decode_value_range(&body).map_err(|source| SourceError::Decode {
            table: table_id.to_string(),
            source,
        })?;

        debug!("Table {} returned {} rows", table_id, table.len());
        Ok(table)
    }
}

/// Decode a values response body. A missing `values` key is an empty table.
pub fn decode_value_range(body: &str) -> Result<Table, serde_json::Error> {
    let range: ValueRange = serde_json::from_str(body)?;

    Ok(range
        .values
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect())
}

/// Render one cell as text. Strings pass through, null is empty.
fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
