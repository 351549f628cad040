//! Parallel retrieval and merge of every configured table.

use crate::models::{AgentRecord, SourceDescriptor};
use crate::pipeline::normalize_table;
use crate::source::TableSource;
use futures::future::join_all;
use tracing::{debug, info, warn};

/// Fetch every source concurrently and concatenate the normalized records.
///
/// Output order is descriptor order, then row order within each table. A
/// source that fails contributes no records and does not affect the
/// others. Each source is requested exactly once.
pub async fn fetch_all(
    source: &dyn TableSource,
    descriptors: &[SourceDescriptor],
) -> Vec<AgentRecord> {
    info!("Fetching {} source tables", descriptors.len());

    let requests = descriptors.iter().map(|descriptor| async move {
        match source.fetch_table(&descriptor.id).await {
            Ok(table) => {
                let records = normalize_table(&table, &descriptor.label);
                debug!("{}: {} records", descriptor.label, records.len());
                records
            }
            Err(e) => {
                warn!("Skipping source {}: {}", descriptor.label, e);
                Vec::new()
            }
        }
    });

    let merged: Vec<AgentRecord> = join_all(requests).await.into_iter().flatten().collect();

    info!("Loaded {} records", merged.len());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FixtureSource, SourceError, Table};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(names: &[&str]) -> Table {
        let mut rows = vec![vec!["First".to_string(), "Last".to_string()]];
        rows.extend(names.iter().map(|n| vec![n.to_string(), "X".to_string()]));
        rows
    }

    fn descriptors(ids: &[&str]) -> Vec<SourceDescriptor> {
        ids.iter()
            .map(|id| SourceDescriptor::new(*id, format!("{}-label", id)))
            .collect()
    }

    /// Counts requests so tests can assert one attempt per source.
    struct CountingSource {
        inner: FixtureSource,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TableSource for CountingSource {
        async fn fetch_table(&self, table_id: &str) -> Result<Table, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_table(table_id).await
        }
    }

    #[tokio::test]
    async fn test_concatenates_in_descriptor_order() {
        let source = FixtureSource::new()
            .with_table("A", table(&["a1", "a2"]))
            .with_table("B", table(&["b1"]));

        let records = fetch_all(&source, &descriptors(&["B", "A"])).await;
        let names: Vec<_> = records.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["b1", "a1", "a2"]);
        assert_eq!(records[0].source_label, "B-label");
        assert_eq!(records[1].source_label, "A-label");
    }

    #[tokio::test]
    async fn test_failed_source_is_isolated() {
        // "B" is absent from the fixture, so its request fails.
        let source = FixtureSource::new()
            .with_table("A", table(&["a1", "a2"]))
            .with_table("C", table(&["c1"]));

        let records = fetch_all(&source, &descriptors(&["A", "B", "C"])).await;
        let names: Vec<_> = records.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2", "c1"]);
    }

    #[tokio::test]
    async fn test_all_sources_fail() {
        let source = FixtureSource::new();
        let records = fetch_all(&source, &descriptors(&["A", "B"])).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_one_attempt_per_source() {
        let source = CountingSource {
            inner: FixtureSource::new().with_table("A", table(&["a1"])),
            calls: AtomicUsize::new(0),
        };

        fetch_all(&source, &descriptors(&["A", "B", "C"])).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_descriptors() {
        let source = FixtureSource::new();
        assert!(fetch_all(&source, &[]).await.is_empty());
    }
}
