//! Rendering and export of dashboard views.

pub mod export;
pub mod generator;

pub use export::{default_columns, export_csv};
pub use generator::{generate_json_report, generate_markdown_report, render_table};
