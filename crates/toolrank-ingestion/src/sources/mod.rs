//! Popularity signal sources.
//!
//! Two kinds of signal feed the score:
//! - bounded: a 0–100 search-interest index, relative within each request,
//!   fetched a few tools at a time;
//! - unbounded: absolute monthly pageview counts of each tool's encyclopedia
//!   article, fetched one document at a time.

pub mod mock;
pub mod pageviews;
pub mod trends_export;

use std::collections::BTreeMap;

use async_trait::async_trait;
use toolrank_common::{MonthKey, Table, ToolName};
use tracing::{debug, warn};

pub use mock::{MockPageviewsSource, MockTrendsSource};
pub use pageviews::PageviewsClient;
pub use trends_export::TrendsExportSource;

/// A fetched signal table plus the non-fatal problems met while fetching it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    pub table: Table,
    pub warnings: Vec<String>,
}

impl Fetched {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Source of a bounded (0–100) relative index.
#[async_trait]
pub trait BoundedSignalSource: Send + Sync {
    fn name(&self) -> &str;

    /// Monthly values for one batch of tools over `[start, end]`.
    ///
    /// Values are only comparable within the batch. Tools with no data may
    /// be missing from the result.
    async fn fetch(
        &self,
        tools: &[ToolName],
        start: MonthKey,
        end: MonthKey,
        region: &str,
    ) -> anyhow::Result<Table>;
}

/// Source of unbounded, non-negative counts keyed by document.
#[async_trait]
pub trait UnboundedSignalSource: Send + Sync {
    fn name(&self) -> &str;

    /// Monthly counts of one document over `[start, end]`.
    async fn fetch_document(
        &self,
        document: &str,
        start: MonthKey,
        end: MonthKey,
    ) -> anyhow::Result<Vec<(MonthKey, f64)>>;

    /// Fetch every tool's document. A failed or empty lookup gives the tool
    /// an all-null column and a warning; it never fails the whole fetch.
    async fn fetch(
        &self,
        documents: &BTreeMap<ToolName, String>,
        start: MonthKey,
        end: MonthKey,
    ) -> Fetched {
        let mut fetched = Fetched::default();
        for (tool, document) in documents {
            fetched.table.add_column(tool.clone());
            match self.fetch_document(document, start, end).await {
                Ok(points) if points.is_empty() => {
                    debug!(tool = %tool, document = %document, "No pageviews returned");
                }
                Ok(points) => {
                    for (month, value) in points {
                        if value.is_finite() {
                            fetched.table.insert(month, tool, value);
                        }
                    }
                }
                Err(e) => {
                    warn!(tool = %tool, document = %document, error = %e, "Pageview lookup failed");
                    fetched
                        .warnings
                        .push(format!("{}: lookup of {document:?} for {tool} failed: {e}", self.name()));
                }
            }
        }
        fetched
    }
}
