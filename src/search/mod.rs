//! Paged time-range extraction from a search backend
//!
//! - [`SearchQuery`] builds the bool/range/sort request body
//! - [`SearchBackend`] abstracts the backend (live HTTP or a fixture file)
//! - [`SearchExtractor`] walks a window in `step`-sized pages

mod backend;
mod extractor;
mod query;

pub use backend::{Backend, FixtureBackend, PageStats, SearchBackend, SearchPage};
pub use extractor::{DEFAULT_LIMIT, DEFAULT_STEP_MS, PagingMode, PagingOptions, SearchExtractor};
pub use query::SearchQuery;
