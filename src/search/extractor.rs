//! Paged extraction of one time window

use super::{SearchBackend, SearchPage, SearchQuery};
use crate::etl::Extractor;
use crate::sources::LogSource;
use crate::window::{TimeWindow, format_timestamp};
use chrono::{DateTime, TimeDelta, Utc};
use eyre::Result;
use serde_json::Value;
use std::sync::Arc;

/// Default paging increment in milliseconds
pub const DEFAULT_STEP_MS: u64 = 1000;

/// Default page size
pub const DEFAULT_LIMIT: usize = 5000;

/// How the lower bound of the range filter moves between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// Every page queries `[window start, cursor]`
    #[default]
    Growing,
    /// Every page queries `[previous cursor, cursor]`
    Sliding,
}

/// Paging parameters for a [`SearchExtractor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingOptions {
    /// Amount the upper bound advances per page, in milliseconds
    pub step_ms: u64,
    /// Maximum hits requested per page
    pub limit: usize,
    pub mode: PagingMode,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            step_ms: DEFAULT_STEP_MS,
            limit: DEFAULT_LIMIT,
            mode: PagingMode::default(),
        }
    }
}

impl PagingOptions {
    /// Check that paging can make progress
    pub fn validate(&self) -> Result<()> {
        if self.step_ms == 0 {
            eyre::bail!("Paging step must be at least 1 millisecond");
        }
        if self.limit == 0 {
            eyre::bail!("Page limit must be at least 1");
        }
        Ok(())
    }

    /// Upper bounds of every page covering `window`
    ///
    /// There are ⌈duration / step⌉ cursors, each `step` past the previous
    /// one and clamped to the window end.
    pub fn cursors(&self, window: &TimeWindow) -> Vec<DateTime<Utc>> {
        let duration_ms = window.duration_ms();
        if self.step_ms == 0 || duration_ms == 0 {
            return Vec::new();
        }

        let pages = duration_ms.div_ceil(self.step_ms);
        (1..=pages)
            .map(|page| {
                let offset = page.saturating_mul(self.step_ms).min(duration_ms);
                window.start + TimeDelta::milliseconds(offset as i64)
            })
            .collect()
    }
}

/// Extracts every hit of one window by querying it page by page
///
/// A page that fails (transport error, bad status, unparsable response) is
/// logged and skipped; the remaining pages are still fetched. Short pages
/// are reported but never retried.
pub struct SearchExtractor<'a, B> {
    backend: &'a B,
    source: Arc<dyn LogSource>,
    window: TimeWindow,
    paging: PagingOptions,
}

impl<'a, B: SearchBackend> SearchExtractor<'a, B> {
    pub fn new(
        backend: &'a B,
        source: Arc<dyn LogSource>,
        window: TimeWindow,
        paging: PagingOptions,
    ) -> Self {
        Self {
            backend,
            source,
            window,
            paging,
        }
    }

    async fn fetch_page(&self, body: &Value) -> Result<SearchPage> {
        let response = self.backend.search(body).await?;
        SearchPage::from_response(response, self.paging.limit)
    }
}

impl<B: SearchBackend> Extractor for SearchExtractor<'_, B> {
    type Item = Value;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        self.paging.validate()?;

        let query = SearchQuery::new(self.paging.limit).with_clause(self.source.query_clause());
        let cursors = self.paging.cursors(&self.window);
        log::debug!(
            "Querying {} page(s) of {} for {}",
            cursors.len(),
            self.source.name(),
            self.window
        );

        let mut hits = Vec::new();
        let mut lower = self.window.start;
        for (page, cursor) in cursors.into_iter().enumerate() {
            let gte = match self.paging.mode {
                PagingMode::Growing => self.window.start,
                PagingMode::Sliding => lower,
            };
            let gte = format_timestamp(&gte);
            let lte = format_timestamp(&cursor);
            let body = query.build(&gte, &lte);

            match self.fetch_page(&body).await {
                Ok(SearchPage { hits: page_hits, stats }) => {
                    log::debug!(
                        "Page {} [{} .. {}]: {} hit(s) of {}",
                        page + 1,
                        gte,
                        lte,
                        stats.returned,
                        stats.total
                    );
                    if stats.truncated > 0 {
                        log::warn!(
                            "Missed {} hit(s) from {} beyond the page limit of {}",
                            stats.truncated,
                            self.source.name(),
                            self.paging.limit
                        );
                    } else if stats.missed > 0 {
                        log::info!("Page {} under-filled by {}", page + 1, stats.missed);
                    }
                    hits.extend(page_hits);
                }
                Err(e) => {
                    log::error!(
                        "An error occurred on page {} [{} .. {}]: {:#}",
                        page + 1,
                        gte,
                        lte,
                        e
                    );
                }
            }

            lower = cursor;
        }

        log::info!("Extracted {} hit(s) from {}", hits.len(), self.source.name());
        Ok(hits)
    }
}
