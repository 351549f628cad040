//! Data models for the QA dashboard.
//!
//! This module contains the core data structures shared by the fetch
//! pipeline, the query layer and the report generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One agent's QA entry from one source table.
///
/// Every field is a plain string and defaults to empty, so downstream
/// string operations never have to handle absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Display label of the source that produced this record.
    pub source_label: String,
    pub first_name: String,
    pub last_name: String,
    pub start_date: String,
    pub supervisor: String,
    /// Free-text score field, e.g. `CS>92%`.
    pub qa_score_text: String,
    pub final_review_text: String,
}

impl AgentRecord {
    /// Returns `first last`, as matched by the name search.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A remote table and the label it stamps onto its records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Table identifier on the remote spreadsheet (sheet name).
    pub id: String,
    /// Label shown in the dashboard and written to `source_label`.
    pub label: String,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A field of [`AgentRecord`] that can be sorted on or exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RecordField {
    Source,
    FirstName,
    LastName,
    StartDate,
    Supervisor,
    QaScore,
    FinalReview,
}

impl RecordField {
    /// All fields in table column order.
    pub const ALL: [RecordField; 7] = [
        RecordField::Source,
        RecordField::FirstName,
        RecordField::LastName,
        RecordField::StartDate,
        RecordField::Supervisor,
        RecordField::QaScore,
        RecordField::FinalReview,
    ];

    /// Borrow this field's value from a record.
    pub fn value<'a>(&self, record: &'a AgentRecord) -> &'a str {
        match self {
            RecordField::Source => &record.source_label,
            RecordField::FirstName => &record.first_name,
            RecordField::LastName => &record.last_name,
            RecordField::StartDate => &record.start_date,
            RecordField::Supervisor => &record.supervisor,
            RecordField::QaScore => &record.qa_score_text,
            RecordField::FinalReview => &record.final_review_text,
        }
    }

    /// Column header label.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::Source => "Call Center",
            RecordField::FirstName => "First Name",
            RecordField::LastName => "Last Name",
            RecordField::StartDate => "Start Date",
            RecordField::Supervisor => "Supervisor",
            RecordField::QaScore => "QA Scores",
            RecordField::FinalReview => "Final Review",
        }
    }

    /// Command-line spelling, as accepted by `--sort`.
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Source => "source",
            RecordField::FirstName => "first-name",
            RecordField::LastName => "last-name",
            RecordField::StartDate => "start-date",
            RecordField::Supervisor => "supervisor",
            RecordField::QaScore => "qa-score",
            RecordField::FinalReview => "final-review",
        }
    }

    /// Parse a field from its key or a few loose spellings.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "source" | "center" | "call-center" => Some(RecordField::Source),
            "first-name" | "first" => Some(RecordField::FirstName),
            "last-name" | "last" => Some(RecordField::LastName),
            "start-date" | "start" => Some(RecordField::StartDate),
            "supervisor" => Some(RecordField::Supervisor),
            "qa-score" | "qa" | "score" => Some(RecordField::QaScore),
            "final-review" | "review" => Some(RecordField::FinalReview),
            _ => None,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sort direction for the query pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Pass/fail classification derived from a QA score field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Pass,
    Fail,
    Neutral,
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationStatus::Pass => write!(f, "Pass"),
            EvaluationStatus::Fail => write!(f, "Fail"),
            EvaluationStatus::Neutral => write!(f, "Neutral"),
        }
    }
}

impl EvaluationStatus {
    /// Returns an emoji representation of the status.
    pub fn emoji(&self) -> &'static str {
        match self {
            EvaluationStatus::Pass => "🟢",
            EvaluationStatus::Fail => "🔴",
            EvaluationStatus::Neutral => "⚪",
        }
    }
}

/// Pass/fail counts for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub label: String,
    pub pass: usize,
    pub fail: usize,
    pub neutral: usize,
}

impl SourceSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.pass + self.fail + self.neutral
    }
}

/// Metadata about a rendered dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewMetadata {
    /// When the merged collection was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Number of records across all sources before filtering.
    pub total_records: usize,
    /// Number of records after filtering.
    pub matched_records: usize,
    pub search_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<RecordField>,
    pub sort_direction: SortDirection,
    pub current_page: usize,
    pub total_pages: usize,
}

/// A complete dashboard view, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub metadata: ViewMetadata,
    /// Pass/fail cards, one per configured source.
    pub summaries: Vec<SourceSummary>,
    /// Records on the current page.
    pub rows: Vec<AgentRecord>,
}
