//! Leaderboards and rank-history views.
//!
//! Both are read-only projections for the presentation layer:
//! - `build_leaderboard`: one category's standings in the latest month.
//! - `build_rank_view`: one category's rank history, reduced to the current
//!   top-K tools over a lookback window, optionally smoothed.

use serde::{Deserialize, Serialize};
use toolrank_common::{Category, MonthKey, Table, ToolName, ViewConfig};

use crate::rank_history::RankTable;

/// Width of the trailing moving average applied when smoothing.
pub const SMOOTHING_WINDOW: usize = 3;

// ── Leaderboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display position, 1..N
    pub position: usize,
    pub tool: ToolName,
    pub score: f64,
    /// Dense rank of the score within the category; equal to other entries
    /// with the same score
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub category: String,
    pub month: MonthKey,
    pub entries: Vec<LeaderboardEntry>,
}

/// Standings of `category` in the most recent month of `scores`.
///
/// Tools are sorted by descending score. Tied scores keep category order for
/// their display position and share the same dense `rank`, so a tie shown on
/// the leaderboard agrees with the rank history. Returns None when `scores`
/// has no months.
pub fn build_leaderboard(scores: &Table, category: &Category, top_n: usize) -> Option<Leaderboard> {
    let month = scores.latest_month()?;

    let mut scored: Vec<(ToolName, f64)> = category
        .tools
        .iter()
        .filter_map(|tool| scores.get(month, tool).map(|s| (tool.clone(), s)))
        .collect();
    // stable sort: ties stay in category order
    scored.sort_by(|a, b| (-a.1).total_cmp(&-b.1));

    // dense rank over the sorted scores: a new rank starts where the score changes
    let mut entries = Vec::with_capacity(scored.len().min(top_n));
    let mut rank = 0u32;
    let mut previous: Option<f64> = None;
    for (i, (tool, score)) in scored.into_iter().enumerate().take(top_n) {
        if previous != Some(score) {
            rank += 1;
            previous = Some(score);
        }
        entries.push(LeaderboardEntry {
            position: i + 1,
            tool,
            score,
            rank,
        });
    }

    Some(Leaderboard {
        category: category.name.clone(),
        month,
        entries,
    })
}

// ── Rank-history view ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankViewOptions {
    /// Keep only the most recent N months (None = all)
    pub lookback_months: Option<usize>,
    /// Keep only the K best tools of the latest month
    pub top_k: usize,
    /// Trailing moving average over ranks
    pub smooth: bool,
}

impl Default for RankViewOptions {
    fn default() -> Self {
        Self::from(&ViewConfig::default())
    }
}

impl From<&ViewConfig> for RankViewOptions {
    fn from(cfg: &ViewConfig) -> Self {
        Self {
            lookback_months: cfg.lookback_months,
            top_k: cfg.top_k,
            smooth: cfg.smooth,
        }
    }
}

/// One point of the chart-ready long format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankPoint {
    pub month: MonthKey,
    pub tool: ToolName,
    pub rank: Option<f64>,
}

/// One row of the current-month ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRank {
    pub tool: ToolName,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankView {
    pub category: String,
    /// Ranks of the selected tools over the window (smoothed if requested)
    pub history: Table,
    /// Latest month's ranking, best first, nulls dropped
    pub current: Vec<CurrentRank>,
}

impl RankView {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Long format: one point per (tool, month), tool-major, months ascending.
    pub fn long_format(&self) -> Vec<RankPoint> {
        self.history
            .columns()
            .iter()
            .flat_map(|tool| {
                self.history.months().map(move |month| RankPoint {
                    month,
                    tool: tool.clone(),
                    rank: self.history.get(month, tool),
                })
            })
            .collect()
    }

    pub fn latest_month(&self) -> Option<MonthKey> {
        self.history.latest_month()
    }
}

/// Build the rank-history view for one category.
///
/// 1. Keep the most recent `lookback_months` months.
/// 2. Sort the latest month's non-null ranks ascending (ties keep column
///    order) and keep the first `top_k` tools.
/// 3. If `smooth` and at least 3 months remain, replace each rank with the
///    mean of itself and up to two preceding observed ranks.
pub fn build_rank_view(category: &str, ranks: &RankTable, opts: &RankViewOptions) -> RankView {
    let windowed = match opts.lookback_months {
        Some(n) if ranks.month_count() > n => ranks.tail(n),
        _ => ranks.clone(),
    };

    let current = current_ranking(&windowed);
    let top: Vec<&str> = current.iter().take(opts.top_k).map(|c| c.tool.as_str()).collect();

    let mut history: Table = windowed.select(&top).map_values(f64::from);
    if opts.smooth && history.month_count() >= SMOOTHING_WINDOW {
        history = smooth_ranks(&history, SMOOTHING_WINDOW);
    }

    RankView {
        category: category.to_string(),
        history,
        current,
    }
}

/// Latest month's ranks, ascending, with unranked tools dropped.
pub fn current_ranking(ranks: &RankTable) -> Vec<CurrentRank> {
    let Some(latest) = ranks.latest_month() else {
        return Vec::new();
    };
    let mut current: Vec<CurrentRank> = ranks
        .columns()
        .iter()
        .filter_map(|tool| {
            ranks.get(latest, tool).map(|rank| CurrentRank { tool: tool.clone(), rank })
        })
        .collect();
    current.sort_by_key(|c| c.rank);
    current
}

/// Trailing moving average per column over `window` months. Uses however
/// many observed values the window holds (at least one), so the series has no
/// leading gaps; a window with no observations stays null.
pub fn smooth_ranks(history: &Table, window: usize) -> Table {
    let mut smoothed = history.clone();
    for tool in history.columns() {
        let values = history.column_values(tool);
        let averaged: Vec<Option<f64>> = (0..values.len())
            .map(|i| {
                let from = (i + 1).saturating_sub(window);
                let observed: Vec<f64> = values[from..=i].iter().flatten().copied().collect();
                if observed.is_empty() {
                    None
                } else {
                    Some(observed.iter().sum::<f64>() / observed.len() as f64)
                }
            })
            .collect();
        smoothed.set_column_values(tool, &averaged);
    }
    smoothed
}
