//! Remote table sources.
//!
//! A [`TableSource`] returns the raw rows of one named table. The
//! aggregation fetcher only depends on this trait, so the HTTP client can
//! be swapped for in-memory fixtures in tests or offline runs.

pub mod fixture;
pub mod sheets;

pub use fixture::FixtureSource;
pub use sheets::{GoogleSheetsSource, SheetsConfig};

use async_trait::async_trait;

/// Raw table rows: ordered sequences of cell strings, header first.
pub type Table = Vec<Vec<String>>;

/// Errors raised while retrieving one table.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request for table '{table}' failed: {source}")]
    Http {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("table '{table}' returned HTTP {status}")]
    Status {
        table: String,
        status: reqwest::StatusCode,
    },

    #[error("table '{table}' returned an unreadable body: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid sheets endpoint '{0}'")]
    InvalidUrl(String),

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A parameterized retrieval keyed by table identifier.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch all rows of the table named `table_id`.
    ///
    /// An empty or absent result is `Ok(vec![])`, not an error.
    async fn fetch_table(&self, table_id: &str) -> Result<Table, SourceError>;
}
