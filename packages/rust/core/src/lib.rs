//! Ranking & visibility aggregation engine for RankScope.
//!
//! Records from a [`rankscope_source::RecordSource`] flow through three pure
//! stages: the aggregator ([`summary`]), the filter/sort stage ([`view`]),
//! and the exporter ([`export`]). [`query`] runs the Record Source round
//! trip on a spawned task and [`session`] holds the domain-keyed state a
//! consumer renders.

pub mod export;
pub mod query;
pub mod session;
pub mod summary;
pub mod view;

pub use export::{CSV_HEADER, CsvExport, CsvQuoting, export_csv};
pub use query::{Pipelines, QueryHandle, QueryOutcome, QueryStatus, QueryTicket, run_query};
pub use session::{Applied, PipelineState, QueryState, Session};
pub use summary::{AiSummary, KeywordSummary, summarize_ai, summarize_keywords};
pub use view::{Expansion, KeywordView, ViewConfig, apply_view};
