//! Filter, sort and paginate the merged collection.

use crate::models::{AgentRecord, RecordField, SortDirection};
use serde::{Deserialize, Serialize};

/// Records per page.
pub const PAGE_SIZE: usize = 10;

/// User-controlled view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search_text: String,
    pub source_filter: Option<String>,
    pub sort_key: Option<RecordField>,
    pub sort_direction: SortDirection,
    /// 1-based page number.
    pub current_page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            source_filter: None,
            sort_key: None,
            sort_direction: SortDirection::Ascending,
            current_page: 1,
        }
    }
}

impl QueryState {
    /// Header-click semantics: same key while ascending flips to
    /// descending, anything else sorts `key` ascending.
    pub fn toggle_sort(&mut self, key: RecordField) {
        let direction = if self.sort_key == Some(key)
            && self.sort_direction == SortDirection::Ascending
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        self.sort_key = Some(key);
        self.sort_direction = direction;
    }

    /// Set the source filter. Empty labels clear it.
    ///
    /// Does not reset `current_page`.
    pub fn set_source_filter(&mut self, label: Option<String>) {
        self.source_filter = label.filter(|l| !l.is_empty());
    }

    /// Does not reset `current_page`.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Go to `page`, clamped below at 1.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    fn matches(&self, record: &AgentRecord, needle: &str) -> bool {
        let name_matches =
            needle.is_empty() || record.full_name().to_lowercase().contains(needle);

        let source_matches = match self.source_filter.as_deref() {
            Some(label) if !label.is_empty() => record.source_label == label,
            _ => true,
        };

        name_matches && source_matches
    }
}

/// Result of running the pipeline over a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    /// Records on the current page.
    pub page: Vec<AgentRecord>,
    /// Every filtered and sorted record, for export and counts.
    pub matched: Vec<AgentRecord>,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Apply name filter, source filter, sort and pagination in that order.
pub fn run_query(records: &[AgentRecord], state: &QueryState) -> QueryOutput {
    let needle = state.search_text.to_lowercase();

    let mut matched: Vec<AgentRecord> = records
        .iter()
        .filter(|r| state.matches(r, &needle))
        .cloned()
        .collect();

    if let Some(key) = state.sort_key {
        sort_records(&mut matched, key, state.sort_direction);
    }

    let current_page = state.current_page.max(1);
    let page = page_slice(&matched, current_page).to_vec();

    QueryOutput {
        page,
        total_pages: total_pages(matched.len()),
        matched,
        current_page,
    }
}

/// Stable, case-insensitive sort on `key`.
pub fn sort_records(records: &mut [AgentRecord], key: RecordField, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = key
            .value(a)
            .to_lowercase()
            .cmp(&key.value(b).to_lowercase());
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Number of pages needed for `count` records.
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Records on 1-based `page`. Pages past the end are empty.
pub fn page_slice(records: &[AgentRecord], page: usize) -> &[AgentRecord] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= records.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(records.len());
    &records[start..end]
}
