//! Raw table rows to [`AgentRecord`]s.

use crate::models::AgentRecord;

const FIRST_NAME: usize = 0;
const LAST_NAME: usize = 1;
const START_DATE: usize = 2;
const SUPERVISOR: usize = 3;
const QA_SCORE: usize = 4;
const FINAL_REVIEW: usize = 7;

/// Convert one table into records stamped with `label`.
///
/// The first row is the header and is skipped. Short rows are padded
/// with empty strings; an empty table yields no records.
pub fn normalize_table(rows: &[Vec<String>], label: &str) -> Vec<AgentRecord> {
    rows.iter()
        .skip(1)
        .map(|row| normalize_row(row, label))
        .collect()
}

fn normalize_row(row: &[String], label: &str) -> AgentRecord {
    let cell = |index: usize| row.get(index).cloned().unwrap_or_default();

    AgentRecord {
        source_label: label.to_string(),
        first_name: cell(FIRST_NAME),
        last_name: cell(LAST_NAME),
        start_date: cell(START_DATE),
        supervisor: cell(SUPERVISOR),
        qa_score_text: cell(QA_SCORE),
        final_review_text: cell(FINAL_REVIEW),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> Vec<String> {
        row(&[
            "First", "Last", "Start", "Supervisor", "QA", "Notes", "Extra", "Final",
        ])
    }

    #[test]
    fn test_empty_table() {
        assert!(normalize_table(&[], "WNS").is_empty());
    }

    #[test]
    fn test_header_only_table() {
        assert!(normalize_table(&[header()], "WNS").is_empty());
    }

    #[test]
    fn test_full_row_mapping() {
        let rows = vec![
            header(),
            row(&[
                "Ann",
                "Lee",
                "2024-01-08",
                "Maria",
                "CS>92%",
                "ignored",
                "ignored",
                "Approved",
            ]),
        ];

        let records = normalize_table(&rows, "Buwelo");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.source_label, "Buwelo");
        assert_eq!(record.first_name, "Ann");
        assert_eq!(record.last_name, "Lee");
        assert_eq!(record.start_date, "2024-01-08");
        assert_eq!(record.supervisor, "Maria");
        assert_eq!(record.qa_score_text, "CS>92%");
        assert_eq!(record.final_review_text, "Approved");
    }

    #[test]
    fn test_missing_final_review_column() {
        let rows = vec![header(), row(&["Bob", "Ray", "2024-02-01", "Tom", "G>80%"])];

        let records = normalize_table(&rows, "TEP");
        assert_eq!(records[0].qa_score_text, "G>80%");
        assert_eq!(records[0].final_review_text, "");
    }

    #[test]
    fn test_short_and_empty_rows() {
        let rows = vec![header(), row(&["Cy"]), Vec::new()];

        let records = normalize_table(&rows, "WNS");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first_name, "Cy");
        assert_eq!(records[0].last_name, "");
        assert_eq!(records[1], AgentRecord {
            source_label: "WNS".to_string(),
            ..AgentRecord::default()
        });
    }

    #[test]
    fn test_preserves_row_order() {
        let rows = vec![header(), row(&["A"]), row(&["B"]), row(&["C"])];
        let names: Vec<_> = normalize_table(&rows, "WNS")
            .into_iter()
            .map(|r| r.first_name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
