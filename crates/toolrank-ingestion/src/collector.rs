//! Signal collection with batching, caching and partial success.
//!
//! The bounded source only compares a handful of terms per request, so tools
//! are fetched in batches of [`BATCH_SIZE`]. Batches are independent: one
//! failing batch is recorded as a warning and the others are kept.

use std::collections::BTreeMap;

use toolrank_common::{MonthKey, Table, ToolName};
use tracing::{info, instrument, warn};

use crate::cache::{CacheKey, FetchCache};
use crate::sources::{BoundedSignalSource, Fetched, UnboundedSignalSource};

/// Maximum tools per bounded-source request.
pub const BATCH_SIZE: usize = 5;

#[derive(Clone, Default)]
pub struct SignalCollector {
    cache: Option<FetchCache>,
}

impl SignalCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: FetchCache) -> Self {
        Self { cache: Some(cache) }
    }

    pub fn cache(&self) -> Option<&FetchCache> {
        self.cache.as_ref()
    }

    /// Fetch the bounded signal for `tools`, `BATCH_SIZE` at a time.
    ///
    /// Successful batches are outer-joined; columns follow the order of
    /// `tools` and tools no batch returned are absent. Only complete results
    /// are cached.
    #[instrument(skip(self, source, tools), fields(source = source.name(), tools = tools.len()))]
    pub async fn collect_bounded(
        &self,
        source: &dyn BoundedSignalSource,
        tools: &[ToolName],
        start: MonthKey,
        end: MonthKey,
        region: &str,
    ) -> Fetched {
        if tools.is_empty() {
            return Fetched::default();
        }
        let key = CacheKey::new(source.name(), tools, start, end, region);
        if let Some(table) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Fetched { table, warnings: Vec::new() };
        }

        let mut joined = Table::new();
        let mut warnings = Vec::new();
        for batch in tools.chunks(BATCH_SIZE) {
            match source.fetch(batch, start, end, region).await {
                Ok(table) if table.is_empty() => continue,
                Ok(table) => joined = joined.outer_join(&table),
                Err(e) => {
                    warn!(batch = ?batch, error = %e, "Batch fetch failed, skipping");
                    warnings.push(format!("{}: batch {:?} failed: {e}", source.name(), batch));
                }
            }
        }

        let table = joined.select(tools);
        info!(
            columns = table.columns().len(),
            months = table.month_count(),
            failed_batches = warnings.len(),
            "Collected bounded signal"
        );
        let fetched = Fetched { table, warnings };
        self.remember(key, &fetched);
        fetched
    }

    /// Fetch the unbounded signal for every tool's document.
    #[instrument(skip(self, source, documents), fields(source = source.name(), tools = documents.len()))]
    pub async fn collect_unbounded(
        &self,
        source: &dyn UnboundedSignalSource,
        documents: &BTreeMap<ToolName, String>,
        start: MonthKey,
        end: MonthKey,
    ) -> Fetched {
        if documents.is_empty() {
            return Fetched::default();
        }
        // the key must change when a document mapping does
        let pairs: Vec<String> = documents.iter().map(|(t, d)| format!("{t}={d}")).collect();
        let key = CacheKey::new(source.name(), &pairs, start, end, "");
        if let Some(table) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Fetched { table, warnings: Vec::new() };
        }

        let fetched = source.fetch(documents, start, end).await;
        info!(
            columns = fetched.table.columns().len(),
            months = fetched.table.month_count(),
            failed = fetched.warnings.len(),
            "Collected unbounded signal"
        );
        self.remember(key, &fetched);
        fetched
    }

    fn remember(&self, key: CacheKey, fetched: &Fetched) {
        if let Some(cache) = &self.cache {
            if fetched.is_complete() {
                cache.put(key, fetched.table.clone());
            }
        }
    }
}
