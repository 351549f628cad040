//! Dashboard view rendering.
//!
//! Renders a [`DashboardView`] as a terminal table, a Markdown document
//! or JSON.

use crate::models::{AgentRecord, DashboardView, RecordField, SourceSummary, ViewMetadata};
use crate::pipeline::{is_flagged, pass_status};
use anyhow::Result;

const NO_RESULTS: &str = "No results found";

/// Render the view for a terminal.
pub fn render_table(view: &DashboardView) -> String {
    let mut output = String::new();

    output.push_str(&format!("Results: {}\n\n", view.metadata.matched_records));
    output.push_str(&generate_summary_cards(&view.summaries));
    output.push('\n');
    output.push_str(&generate_text_table(&view.rows, &view.metadata));
    output.push_str(&generate_pagination(
        view.metadata.current_page,
        view.metadata.total_pages,
    ));

    output
}

/// Pass/fail counts, one line per source.
fn generate_summary_cards(summaries: &[SourceSummary]) -> String {
    let width = summaries
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);

    summaries
        .iter()
        .map(|s| {
            format!(
                "  {:<width$}  🟢 {} pass  🔴 {} fail\n",
                s.label,
                s.pass,
                s.fail,
                width = width
            )
        })
        .collect()
}

/// Header label, with an arrow on the active sort column.
fn header_label(field: RecordField, metadata: &ViewMetadata) -> String {
    if metadata.sort_key == Some(field) {
        format!("{} {}", field.label(), metadata.sort_direction.arrow())
    } else {
        field.label().to_string()
    }
}

fn generate_text_table(rows: &[AgentRecord], metadata: &ViewMetadata) -> String {
    let headers: Vec<String> = RecordField::ALL
        .iter()
        .map(|&f| header_label(f, metadata))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, field) in RecordField::ALL.iter().enumerate() {
            let len = display_cell(*field, row).chars().count();
            widths[i] = widths[i].max(len);
        }
    }

    let mut table = String::new();

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    table.push_str(&format!("   {}\n", header_line.join(" | ")));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    table.push_str(&format!("   {}\n", rule.join("-+-")));

    if rows.is_empty() {
        table.push_str(&format!("   {}\n", NO_RESULTS));
        return table;
    }

    for row in rows {
        let marker = if is_flagged(&row.qa_score_text) { "!" } else { " " };
        let cells: Vec<String> = RecordField::ALL
            .iter()
            .zip(&widths)
            .map(|(f, w)| pad(&display_cell(*f, row), *w))
            .collect();
        table.push_str(&format!(" {} {}\n", marker, cells.join(" | ")));
    }

    table
}

/// Cell text for terminal output; the source column is shown as a badge.
fn display_cell(field: RecordField, row: &AgentRecord) -> String {
    match field {
        RecordField::Source => format!("[{}]", row.source_label),
        other => other.value(row).to_string(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// One entry per page with the current page bracketed. Empty for a
/// single page.
fn generate_pagination(current_page: usize, total_pages: usize) -> String {
    if total_pages <= 1 {
        return String::new();
    }

    let pages: Vec<String> = (1..=total_pages)
        .map(|p| {
            if p == current_page {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect();

    format!("\nPages: {}\n", pages.join(" "))
}

/// Generate a Markdown document for the view.
pub fn generate_markdown_report(view: &DashboardView) -> String {
    let mut output = String::new();

    output.push_str("# Agent QA Search\n\n");
    output.push_str(&generate_metadata_section(&view.metadata));
    output.push_str(&generate_summary_section(&view.summaries));
    output.push_str(&generate_results_section(&view.rows));

    let pagination = generate_pagination(view.metadata.current_page, view.metadata.total_pages);
    if !pagination.is_empty() {
        output.push_str(pagination.trim_start());
        output.push('\n');
    }

    output
}

fn generate_metadata_section(metadata: &ViewMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Query\n\n");
    section.push_str(&format!(
        "- **Fetched:** {}\n",
        metadata.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if !metadata.search_text.is_empty() {
        section.push_str(&format!("- **Search:** `{}`\n", metadata.search_text));
    }
    section.push_str(&format!(
        "- **Call Center:** {}\n",
        metadata.source_filter.as_deref().unwrap_or("All Call Centers")
    ));
    if let Some(key) = metadata.sort_key {
        section.push_str(&format!(
            "- **Sorted by:** {} {}\n",
            key.label(),
            metadata.sort_direction.arrow()
        ));
    }
    section.push_str(&format!(
        "- **Results:** {} of {}\n",
        metadata.matched_records, metadata.total_records
    ));
    section.push('\n');

    section
}

fn generate_summary_section(summaries: &[SourceSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Call Center | 🟢 Pass | 🔴 Fail | Total |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for summary in summaries {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            summary.label,
            summary.pass,
            summary.fail,
            summary.total()
        ));
    }
    section.push('\n');

    section
}

fn generate_results_section(rows: &[AgentRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    let headers: Vec<&str> = RecordField::ALL.iter().map(|f| f.label()).collect();
    section.push_str(&format!("| | {} |\n", headers.join(" | ")));
    section.push_str(&format!("|---|{}\n", "---|".repeat(headers.len())));

    if rows.is_empty() {
        section.push_str(&format!("| | {} |\n\n", NO_RESULTS));
        return section;
    }

    for row in rows {
        let cells: Vec<String> = RecordField::ALL
            .iter()
            .map(|f| escape_markdown(f.value(row)))
            .collect();
        section.push_str(&format!(
            "| {} | {} |\n",
            pass_status(&row.qa_score_text).emoji(),
            cells.join(" | ")
        ));
    }
    section.push('\n');

    section
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON report.
pub fn generate_json_report(view: &DashboardView) -> Result<String> {
    serde_json::to_string_pretty(view).map_err(Into::into)
}
