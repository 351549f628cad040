//! The record pipeline.
//!
//! Fetch and normalize every configured table, then filter, sort,
//! paginate and classify the merged collection.

pub mod evaluation;
pub mod fetcher;
pub mod normalizer;
pub mod query;

pub use evaluation::{is_flagged, pass_status, summarize};
pub use fetcher::fetch_all;
pub use normalizer::normalize_table;
pub use query::{run_query, QueryOutput, QueryState};
