//! Refresh pipeline orchestrator.
//!
//! Stages:
//!   1. Tool universe + document map from the tracker config
//!   2. Fetch bounded signal (batched)
//!   3. Fetch unbounded signal (per document, if enabled; otherwise load its
//!      stored history)
//!   4. Merge both into their stored histories and save
//!   5. Compose scores, merge into the stored score history and save
//!   6. Rebuild rank history for every category
//!
//! Nothing after configuration validation aborts a run: fetch and storage
//! problems are logged, collected into `RefreshReport::warnings`, and the run
//! continues with whatever data is available.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use toolrank_common::{MonthKey, Table, TrackerConfig};
use toolrank_db::HistoryStore;
use toolrank_ingestion::{BoundedSignalSource, SignalCollector, UnboundedSignalSource};
use toolrank_ranker::{build_rank_history, compose_scores, merge_history, RankMethod, RankTable, SignalWeights};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The signal sources a refresh reads from.
pub struct RefreshSources<'a> {
    pub bounded: &'a dyn BoundedSignalSource,
    /// None disables the unbounded signal regardless of configuration
    pub unbounded: Option<&'a dyn UnboundedSignalSource>,
}

/// Result of one refresh run.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub start: MonthKey,
    pub end: MonthKey,
    /// Merged bounded-signal history
    pub trends: Table,
    /// Merged unbounded-signal history (the stored one when fetching is disabled)
    pub pageviews: Table,
    /// Merged score history
    pub scores: Table,
    /// Category name → rank table
    pub ranks: BTreeMap<String, RankTable>,
    pub warnings: Vec<String>,
}

impl RefreshReport {
    pub fn has_data(&self) -> bool {
        !self.scores.is_empty()
    }
}

/// Run a full refresh against `store`.
#[instrument(skip_all, fields(region = %config.region_label()))]
pub async fn run_refresh(
    config: &TrackerConfig,
    sources: &RefreshSources<'_>,
    collector: &SignalCollector,
    store: &dyn HistoryStore,
) -> anyhow::Result<RefreshReport> {
    config.validate()?;

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let (start, end) = (config.start, config.end_month());
    let mut warnings = Vec::new();

    // ── Stage 1: Tool universe ───────────────────────────────────────────────
    let tools = config.all_tools();
    let documents = config.document_map();
    info!(%run_id, tools = tools.len(), %start, %end, "Starting refresh");

    // ── Stage 2: Bounded signal ──────────────────────────────────────────────
    let fetched = collector
        .collect_bounded(sources.bounded, &tools, start, end, &config.region)
        .await;
    warnings.extend(fetched.warnings);
    let trends = merge_into_store(store, &config.trends_history_key(), &fetched.table, &mut warnings);

    // ── Stage 3: Unbounded signal ────────────────────────────────────────────
    // Stored pageviews still feed the scores when fetching is disabled.
    let pageviews = match sources.unbounded {
        Some(source) if config.use_pageviews => {
            let fetched = collector.collect_unbounded(source, &documents, start, end).await;
            warnings.extend(fetched.warnings);
            merge_into_store(store, config.pageviews_history_key(), &fetched.table, &mut warnings)
        }
        _ => {
            let stored = store.load(config.pageviews_history_key());
            info!(stored_months = stored.month_count(), "Pageview fetch disabled, using stored history");
            stored
        }
    };

    // ── Stage 4: Scores ──────────────────────────────────────────────────────
    let weights = SignalWeights::from(&config.scoring);
    let composed = compose_scores(&trends, &pageviews, &weights);
    let scores = merge_into_store(store, &config.scores_history_key(), &composed, &mut warnings);

    // ── Stage 5: Rank history ────────────────────────────────────────────────
    let ranks = build_rank_history(&scores, &config.categories, RankMethod::Dense);

    info!(
        %run_id,
        score_months = scores.month_count(),
        categories = ranks.len(),
        warnings = warnings.len(),
        "Refresh complete"
    );

    Ok(RefreshReport {
        run_id,
        started_at,
        start,
        end,
        trends,
        pageviews,
        scores,
        ranks,
        warnings,
    })
}

/// Load `key`, merge `fresh` into it and save the result.
/// An empty `fresh` leaves the stored history untouched.
fn merge_into_store(
    store: &dyn HistoryStore,
    key: &str,
    fresh: &Table,
    warnings: &mut Vec<String>,
) -> Table {
    let history = store.load(key);
    if fresh.is_empty() {
        return history;
    }
    let merged = merge_history(&history, fresh);
    if let Err(e) = store.save(key, &merged) {
        warn!(key, error = %e, "Failed to save history");
        warnings.push(format!("saving {key} failed: {e}"));
    }
    merged
}

/// Stored score history and its rank tables, without fetching anything.
pub fn load_rankings(config: &TrackerConfig, store: &dyn HistoryStore) -> (Table, BTreeMap<String, RankTable>) {
    let scores = store.load(&config.scores_history_key());
    let ranks = build_rank_history(&scores, &config.categories, RankMethod::Dense);
    (scores, ranks)
}
