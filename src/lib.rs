//! Log Harvester
//!
//! A windowed ETL tool that pages log hits out of a search index and writes
//! them to per-window text and CSV files, plus an access log parser for the
//! raw reverse-proxy lines it collects.

pub mod access_log;
pub mod cli;
pub mod client;
pub mod etl;
pub mod harvester;
pub mod job;
pub mod record;
pub mod search;
pub mod sources;
pub mod storage;
pub mod window;

// Re-exports for convenience
pub use client::{Auth, SearchClient};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use harvester::{RunSummary, WindowedPipeline};
pub use job::JobFile;
pub use record::Record;
pub use search::{Backend, FixtureBackend, PagingMode, PagingOptions, SearchBackend};
pub use sources::{LogSource, SourceKind};
pub use window::TimeWindow;
