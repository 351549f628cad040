//! QA score classification.
//!
//! A score field looks like `CS>92%` or `G>85% (retake)`. The category
//! prefix selects the pass threshold and the first `N%` is the score.

use crate::models::{AgentRecord, EvaluationStatus, SourceDescriptor, SourceSummary};
use regex::Regex;
use std::sync::OnceLock;

/// Minimum passing score for the customer-service (`CS`) category.
pub const CS_PASS_THRESHOLD: u32 = 90;
/// Minimum passing score for the general (`G`) category.
pub const G_PASS_THRESHOLD: u32 = 85;

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([0-9]+)%").expect("score pattern is valid"))
}

/// Extract the first percentage in `text`.
///
/// Only ASCII digits count. Values too large for `u32` saturate.
fn first_score(text: &str) -> Option<u32> {
    score_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
}

/// Pass threshold for the category prefix of `text`, if recognised.
fn threshold_for(text: &str) -> Option<u32> {
    let prefix = text.trim_start().to_ascii_uppercase();
    if prefix.starts_with("CS") {
        Some(CS_PASS_THRESHOLD)
    } else if prefix.starts_with('G') {
        Some(G_PASS_THRESHOLD)
    } else {
        None
    }
}

/// Classify a QA score field as pass, fail or neutral.
pub fn pass_status(text: &str) -> EvaluationStatus {
    let Some(score) = first_score(text) else {
        return EvaluationStatus::Neutral;
    };

    match threshold_for(text) {
        Some(threshold) if score >= threshold => EvaluationStatus::Pass,
        Some(_) => EvaluationStatus::Fail,
        None => EvaluationStatus::Neutral,
    }
}

/// Whether a row should be highlighted as low-scoring.
pub fn is_flagged(text: &str) -> bool {
    pass_status(text) == EvaluationStatus::Fail
}

/// Count pass/fail/neutral per source, in descriptor order.
///
/// Records whose label matches no descriptor are not counted.
pub fn summarize(records: &[AgentRecord], descriptors: &[SourceDescriptor]) -> Vec<SourceSummary> {
    let mut summaries: Vec<SourceSummary> = descriptors
        .iter()
        .map(|d| SourceSummary::new(d.label.clone()))
        .collect();

    for record in records {
        let Some(summary) = summaries
            .iter_mut()
            .find(|s| s.label == record.source_label)
        else {
            continue;
        };

        match pass_status(&record.qa_score_text) {
            EvaluationStatus::Pass => summary.pass += 1,
            EvaluationStatus::Fail => summary.fail += 1,
            EvaluationStatus::Neutral => summary.neutral += 1,
        }
    }

    summaries
}
