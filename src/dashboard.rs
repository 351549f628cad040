//! Dashboard state and interactive session.
//!
//! The dashboard owns the loaded collection and the current
//! [`QueryState`]. Every view is recomputed from those two on demand.

use crate::models::{AgentRecord, DashboardView, RecordField, SourceDescriptor, ViewMetadata};
use crate::pipeline::{fetch_all, run_query, summarize, QueryOutput, QueryState};
use crate::report::{default_columns, export_csv, render_table};
use crate::source::TableSource;
use anyhow::Result;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Whether the merged collection is available yet.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready {
        records: Vec<AgentRecord>,
        fetched_at: DateTime<Utc>,
    },
}

/// A fetch cycle running on its own task.
pub struct PendingLoad {
    pub receiver: oneshot::Receiver<Vec<AgentRecord>>,
    pub task: JoinHandle<()>,
}

/// Start a fetch cycle. The merged result is delivered once, after every
/// source has settled. If the receiver is gone by then, it is dropped.
pub fn spawn_load(
    source: Arc<dyn TableSource>,
    descriptors: Vec<SourceDescriptor>,
) -> PendingLoad {
    let (sender, receiver) = oneshot::channel();

    let task = tokio::spawn(async move {
        let records = fetch_all(source.as_ref(), &descriptors).await;
        if sender.send(records).is_err() {
            debug!("Dashboard closed before load finished, discarding result");
        }
    });

    PendingLoad { receiver, task }
}

/// A user action in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Source(Option<String>),
    Sort(RecordField),
    Page(usize),
    Next,
    Prev,
    Export(Option<PathBuf>),
    Reload,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "source" => {
                if rest.is_empty() || rest.eq_ignore_ascii_case("all") {
                    Ok(Command::Source(None))
                } else {
                    Ok(Command::Source(Some(rest.to_string())))
                }
            }
            "sort" => RecordField::parse(rest).map(Command::Sort).ok_or_else(|| {
                let known: Vec<_> = RecordField::ALL.iter().map(|f| f.key()).collect();
                format!("Unknown column '{}' (one of: {})", rest, known.join(", "))
            }),
            "page" | "p" => rest
                .parse::<usize>()
                .ok()
                .filter(|p| *p >= 1)
                .map(Command::Page)
                .ok_or_else(|| format!("Invalid page '{}'", rest)),
            "next" | "n" => Ok(Command::Next),
            "prev" => Ok(Command::Prev),
            "export" => Ok(Command::Export(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "reload" => Ok(Command::Reload),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("Empty command".to_string()),
            other => Err(format!("Unknown command '{}' (type 'help')", other)),
        }
    }
}

/// Result of applying a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Render,
    Message(String),
    Reload,
    Quit,
}

const HELP: &str = "\
Commands:
  search <text>      filter by name (empty clears)
  source <label|all> filter by call center
  sort <column>      sort by column; repeat to flip direction
                     columns: source, first-name, last-name, start-date,
                              supervisor, qa-score, final-review
  page <n> | next | prev
  export [file]      write all matching records to CSV
  reload             fetch every source again
  quit";

/// Loaded records plus view state.
pub struct Dashboard {
    source: Arc<dyn TableSource>,
    descriptors: Vec<SourceDescriptor>,
    export_path: PathBuf,
    pub state: QueryState,
    load_state: LoadState,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn TableSource>,
        descriptors: Vec<SourceDescriptor>,
        export_path: PathBuf,
        state: QueryState,
    ) -> Self {
        Self {
            source,
            descriptors,
            export_path,
            state,
            load_state: LoadState::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading)
    }

    /// Run one fetch cycle and install the result.
    pub async fn load(&mut self, show_progress: bool) {
        self.load_state = LoadState::Loading;

        let spinner = show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("Loading {} sources...", self.descriptors.len()));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let pending = spawn_load(self.source.clone(), self.descriptors.clone());
        let records = match pending.receiver.await {
            Ok(records) => records,
            Err(_) => {
                if let Err(e) = pending.task.await {
                    warn!("Load task failed: {}", e);
                }
                Vec::new()
            }
        };

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        self.install(records);
    }

    /// Replace the collection wholesale.
    pub fn install(&mut self, records: Vec<AgentRecord>) {
        info!("Installed {} records", records.len());
        self.load_state = LoadState::Ready {
            records,
            fetched_at: Utc::now(),
        };
    }

    /// Run the query pipeline. `None` while loading.
    pub fn query(&self) -> Option<QueryOutput> {
        match &self.load_state {
            LoadState::Loading => None,
            LoadState::Ready { records, .. } => Some(run_query(records, &self.state)),
        }
    }

    /// Build the full view: page, counts and per-source summaries.
    pub fn view(&self) -> Option<DashboardView> {
        let LoadState::Ready {
            records,
            fetched_at,
        } = &self.load_state
        else {
            return None;
        };

        let output = run_query(records, &self.state);
        let summaries = summarize(&output.matched, &self.descriptors);

        Some(DashboardView {
            metadata: ViewMetadata {
                fetched_at: *fetched_at,
                total_records: records.len(),
                matched_records: output.matched.len(),
                search_text: self.state.search_text.clone(),
                source_filter: self.state.source_filter.clone(),
                sort_key: self.state.sort_key,
                sort_direction: self.state.sort_direction,
                current_page: output.current_page,
                total_pages: output.total_pages,
            },
            summaries,
            rows: output.page,
        })
    }

    /// Export every matching record, regardless of page.
    pub fn export(&self, path: Option<PathBuf>) -> Result<(usize, PathBuf)> {
        let path = path.unwrap_or_else(|| self.export_path.clone());
        let matched = self.query().map(|o| o.matched).unwrap_or_default();
        let count = export_csv(&matched, &default_columns(), &path)?;
        Ok((count, path))
    }

    /// Apply one command to the view state.
    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::Search(text) => self.state.set_search_text(text),
            Command::Source(label) => {
                if let Some(ref l) = label {
                    if !self.descriptors.iter().any(|d| &d.label == l) {
                        return Outcome::Message(format!("Unknown call center '{}'", l));
                    }
                }
                self.state.set_source_filter(label);
            }
            Command::Sort(field) => self.state.toggle_sort(field),
            Command::Page(page) => self.state.set_page(page),
            Command::Next => {
                let total = self.query().map(|o| o.total_pages).unwrap_or(0);
                if self.state.current_page < total {
                    self.state.set_page(self.state.current_page + 1);
                }
            }
            Command::Prev => self.state.set_page(self.state.current_page.saturating_sub(1)),
            Command::Export(path) => {
                return match self.export(path) {
                    Ok((count, path)) => Outcome::Message(format!(
                        "Exported {} records to {}",
                        count,
                        path.display()
                    )),
                    Err(e) => Outcome::Message(format!("Export failed: {}", e)),
                };
            }
            Command::Reload => return Outcome::Reload,
            Command::Help => return Outcome::Message(HELP.to_string()),
            Command::Quit => return Outcome::Quit,
        }
        Outcome::Render
    }

    /// Read commands until `quit` or end of input, rendering after each.
    pub async fn run_interactive<R, W>(&mut self, input: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.render_to(&mut out)?;
        writeln!(out, "Type 'help' for commands.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let outcome = match Command::parse(&line) {
                Ok(command) => self.apply(command),
                Err(message) => Outcome::Message(message),
            };

            match outcome {
                Outcome::Render => self.render_to(&mut out)?,
                Outcome::Message(message) => writeln!(out, "{}", message)?,
                Outcome::Reload => {
                    self.load(false).await;
                    self.render_to(&mut out)?;
                }
                Outcome::Quit => break,
            }
        }

        Ok(())
    }

    fn render_to<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.is_loading() {
            writeln!(out, "Loading...")?;
            return Ok(());
        }
        if let Some(view) = self.view() {
            write!(out, "{}", render_table(&view))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FixtureSource, SourceError, Table};
    use async_trait::async_trait;

    fn table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = vec![vec!["First".to_string(), "Last".to_string()]];
        for (first, last, score) in rows {
            table.push(vec![
                first.to_string(),
                last.to_string(),
                String::new(),
                String::new(),
                score.to_string(),
            ]);
        }
        table
    }

    fn descriptors() -> Vec<SourceDescriptor> {
        vec![
            SourceDescriptor::new("BUW", "Buwelo"),
            SourceDescriptor::new("WNS", "WNS"),
        ]
    }

    fn fixture() -> FixtureSource {
        FixtureSource::new()
            .with_table(
                "BUW",
                table(&[("Ann", "Smith", "CS>92%"), ("Bob", "Adams", "CS>50%")]),
            )
            .with_table("WNS", table(&[("Cy", "Jones", "G>80%")]))
    }

    fn make_dashboard(source: impl TableSource + 'static) -> Dashboard {
        let export_path = std::env::temp_dir().join("agentqa-unused.csv");
        Dashboard::new(Arc::new(source), descriptors(), export_path, QueryState::default())
    }

    async fn loaded_dashboard() -> Dashboard {
        let mut dashboard = make_dashboard(fixture());
        dashboard.load(false).await;
        dashboard
    }

    /// Answers after a delay, so a load is still outstanding when polled.
    struct SlowSource;

    #[async_trait]
    impl TableSource for SlowSource {
        async fn fetch_table(&self, _table_id: &str) -> Result<Table, SourceError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(table(&[("Late", "Row", "")]))
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("search ann lee"),
            Ok(Command::Search("ann lee".to_string()))
        );
        assert_eq!(Command::parse("search"), Ok(Command::Search(String::new())));
        assert_eq!(Command::parse("source all"), Ok(Command::Source(None)));
        assert_eq!(
            Command::parse("source WNS"),
            Ok(Command::Source(Some("WNS".to_string())))
        );
        assert_eq!(
            Command::parse("sort last-name"),
            Ok(Command::Sort(RecordField::LastName))
        );
        assert_eq!(Command::parse("page 3"), Ok(Command::Page(3)));
        assert_eq!(Command::parse("NEXT"), Ok(Command::Next));
        assert_eq!(Command::parse("export"), Ok(Command::Export(None)));
        assert_eq!(
            Command::parse("export out.csv"),
            Ok(Command::Export(Some(PathBuf::from("out.csv"))))
        );
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("page 0").is_err());
        assert!(Command::parse("page two").is_err());
        assert!(Command::parse("sort salary").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_query_is_none_while_loading() {
        let dashboard = make_dashboard(fixture());
        assert!(dashboard.is_loading());
        assert!(dashboard.query().is_none());
        assert!(dashboard.view().is_none());
    }

    #[tokio::test]
    async fn test_render_while_loading() {
        let dashboard = make_dashboard(fixture());
        let mut output = Vec::new();
        dashboard.render_to(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Loading...\n");

        let dashboard = loaded_dashboard().await;
        let mut output = Vec::new();
        dashboard.render_to(&mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().starts_with("Results: 3"));
    }

    #[tokio::test]
    async fn test_load_installs_merged_records() {
        let dashboard = loaded_dashboard().await;
        assert!(!dashboard.is_loading());

        let output = dashboard.query().unwrap();
        let names: Vec<_> = output.matched.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bob", "Cy"]);
    }

    #[tokio::test]
    async fn test_view_summaries_use_filtered_collection() {
        let mut dashboard = loaded_dashboard().await;
        dashboard.apply(Command::Search("a".to_string()));

        // "Ann Smith" and "Bob Adams" match; "Cy Jones" does not.
        let view = dashboard.view().unwrap();
        assert_eq!(view.metadata.matched_records, 2);
        assert_eq!(view.metadata.total_records, 3);
        assert_eq!((view.summaries[0].pass, view.summaries[0].fail), (1, 1));
        assert_eq!((view.summaries[1].pass, view.summaries[1].fail), (0, 0));
    }

    #[tokio::test]
    async fn test_apply_sort_toggles() {
        let mut dashboard = loaded_dashboard().await;

        assert_eq!(dashboard.apply(Command::Sort(RecordField::LastName)), Outcome::Render);
        let ascending: Vec<_> = dashboard
            .query()
            .unwrap()
            .matched
            .into_iter()
            .map(|r| r.last_name)
            .collect();
        assert_eq!(ascending, vec!["Adams", "Jones", "Smith"]);

        dashboard.apply(Command::Sort(RecordField::LastName));
        let descending: Vec<_> = dashboard
            .query()
            .unwrap()
            .matched
            .into_iter()
            .map(|r| r.last_name)
            .collect();
        assert_eq!(descending, vec!["Smith", "Jones", "Adams"]);
    }

    #[tokio::test]
    async fn test_apply_unknown_source_is_reported() {
        let mut dashboard = loaded_dashboard().await;
        let outcome = dashboard.apply(Command::Source(Some("Nowhere".to_string())));
        assert!(matches!(outcome, Outcome::Message(_)));
        assert_eq!(dashboard.state.source_filter, None);
    }

    #[tokio::test]
    async fn test_next_and_prev_stay_in_range() {
        let mut dashboard = loaded_dashboard().await;
        dashboard.apply(Command::Next);
        assert_eq!(dashboard.state.current_page, 1);
        dashboard.apply(Command::Prev);
        assert_eq!(dashboard.state.current_page, 1);
    }

    #[tokio::test]
    async fn test_export_ignores_pagination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut dashboard = loaded_dashboard().await;
        dashboard.apply(Command::Page(5));
        let (count, written) = dashboard.export(Some(path.clone())).unwrap();

        assert_eq!(count, 3);
        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_dropped_receiver_discards_result() {
        let pending = spawn_load(Arc::new(SlowSource), descriptors());
        drop(pending.receiver);

        // The task finishes normally instead of panicking on send.
        assert!(pending.task.await.is_ok());
    }

    #[tokio::test]
    async fn test_run_interactive_session() {
        let mut dashboard = loaded_dashboard().await;
        let input: &[u8] = b"search bob\nsort first-name\nbogus\nquit\nsearch never\n";
        let mut output = Vec::new();

        dashboard.run_interactive(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Results: 1"));
        assert!(text.contains("Unknown command 'bogus'"));
        assert_eq!(dashboard.state.search_text, "bob");
        assert_eq!(dashboard.state.sort_key, Some(RecordField::FirstName));
    }

    #[tokio::test]
    async fn test_run_interactive_reload() {
        let mut dashboard = loaded_dashboard().await;
        let input: &[u8] = b"reload\n";
        let mut output = Vec::new();

        dashboard.run_interactive(input, &mut output).await.unwrap();
        assert_eq!(dashboard.query().unwrap().matched.len(), 3);
    }
}
