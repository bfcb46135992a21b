//! In-memory signal sources for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use async_trait::async_trait;
use toolrank_common::{MonthKey, Table, ToolName};

use super::{BoundedSignalSource, UnboundedSignalSource};
use crate::collector::BATCH_SIZE;

// ── Bounded ──────────────────────────────────────────────────────────────────

/// Mock search-interest source with fixed data.
#[derive(Default)]
pub struct MockTrendsSource {
    data: Table,
    failing: HashSet<ToolName>,
    calls: AtomicUsize,
}

impl MockTrendsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one monthly value.
    pub fn with(mut self, tool: &str, month: MonthKey, value: f64) -> Self {
        self.data.insert(month, tool, value);
        self
    }

    /// Add a whole table of values.
    pub fn with_table(mut self, table: &Table) -> Self {
        self.data = self.data.outer_join(table);
        self
    }

    /// Any batch containing `tool` fails.
    pub fn failing_on(mut self, tool: &str) -> Self {
        self.failing.insert(tool.to_string());
        self
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoundedSignalSource for MockTrendsSource {
    fn name(&self) -> &str {
        "mock-trends"
    }

    async fn fetch(
        &self,
        tools: &[ToolName],
        start: MonthKey,
        end: MonthKey,
        _region: &str,
    ) -> anyhow::Result<Table> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if tools.len() > BATCH_SIZE {
            bail!("batch of {} exceeds {} terms", tools.len(), BATCH_SIZE);
        }
        if let Some(bad) = tools.iter().find(|t| self.failing.contains(*t)) {
            bail!("rate limited while fetching {bad}");
        }
        Ok(self.data.between(start, end).select(tools))
    }
}

// ── Unbounded ────────────────────────────────────────────────────────────────

/// Mock pageview source keyed by document title.
#[derive(Default)]
pub struct MockPageviewsSource {
    data: HashMap<String, Vec<(MonthKey, f64)>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl MockPageviewsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, document: &str, month: MonthKey, views: f64) -> Self {
        self.data.entry(document.to_string()).or_default().push((month, views));
        self
    }

    /// Lookups of `document` fail.
    pub fn failing_on(mut self, document: &str) -> Self {
        self.failing.insert(document.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnboundedSignalSource for MockPageviewsSource {
    fn name(&self) -> &str {
        "mock-pageviews"
    }

    async fn fetch_document(
        &self,
        document: &str,
        start: MonthKey,
        end: MonthKey,
    ) -> anyhow::Result<Vec<(MonthKey, f64)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(document) {
            bail!("HTTP 404 for {document}");
        }
        let mut points: Vec<(MonthKey, f64)> = self
            .data
            .get(document)
            .map(|p| p.iter().copied().filter(|(m, _)| *m >= start && *m <= end).collect())
            .unwrap_or_default();
        points.sort_by_key(|(m, _)| *m);
        Ok(points)
    }
}
