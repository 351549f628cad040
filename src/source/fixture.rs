//! In-memory table source.
//!
//! Serves pre-fetched tables, for tests and for running the dashboard
//! without network access (`--fixture tables.json`).

use super::{SourceError, Table, TableSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// [`TableSource`] over a fixed map of table id to rows.
///
/// Requests for a table that is not in the map fail with
/// [`SourceError::UnknownTable`].
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    tables: HashMap<String, Table>,
}

impl FixtureSource {
    #[allow(dead_code)] // Builder for tests and embedding
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    #[allow(dead_code)] // Builder for tests and embedding
    pub fn with_table(mut self, id: impl Into<String>, table: Table) -> Self {
        self.tables.insert(id.into(), table);
        self
    }

    /// Load tables from a JSON object of `{ "<id>": [[cell, ...], ...] }`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;

        let tables: HashMap<String, Table> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture file: {}", path.display()))?;

        Ok(Self { tables })
    }
}

#[async_trait]
impl TableSource for FixtureSource {
    async fn fetch_table(&self, table_id: &str) -> Result<Table, SourceError> {
        self.tables
            .get(table_id)
            .cloned()
            .ok_or_else(|| SourceError::UnknownTable(table_id.to_string()))
    }
}
