//! CSV export.
//!
//! Writes one header row of labels, then one row per record with one
//! field per column mapping entry, in mapping order.

use crate::models::{AgentRecord, RecordField};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// A CSV column: header label and the record field it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub label: &'static str,
    pub field: RecordField,
}

/// The fixed export layout: every record field in table order.
pub fn default_columns() -> Vec<ColumnMapping> {
    RecordField::ALL
        .iter()
        .map(|&field| ColumnMapping {
            label: field.label(),
            field,
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write `rows` as CSV to `writer`.
pub fn write_csv<W: Write>(
    writer: W,
    rows: &[AgentRecord],
    columns: &[ColumnMapping],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|c| c.label))?;
    for row in rows {
        csv_writer.write_record(columns.iter().map(|c| c.field.value(row)))?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write `rows` to the file at `path`. Returns the number of data rows.
pub fn export_csv(
    rows: &[AgentRecord],
    columns: &[ColumnMapping],
    path: &Path,
) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    write_csv(file, rows, columns)?;
    info!("Exported {} records to {}", rows.len(), path.display());
    Ok(rows.len())
}
