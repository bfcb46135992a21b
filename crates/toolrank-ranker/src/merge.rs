//! History merge.
//!
//! Folds a freshly fetched table into the persisted history for the same
//! key. Fresh observations supersede stale ones, so re-fetching a partially
//! observed current month simply overwrites it.

use toolrank_common::Table;
use tracing::debug;

/// Merge `fresh` into `history`.
///
/// - Empty history → `fresh` unchanged.
/// - Otherwise the union of months; columns are history's followed by the
///   new columns of `fresh`.
/// - A cell present in both takes the value from `fresh`; a cell present in
///   only one input is kept. Null cells in `fresh` are absences and never
///   erase a history value.
pub fn merge_history(history: &Table, fresh: &Table) -> Table {
    if history.is_empty() {
        return fresh.clone();
    }

    let mut merged = history.clone();
    for col in fresh.columns() {
        merged.add_column(col.clone());
    }
    for month in fresh.months() {
        merged.add_month(month);
    }

    let mut overwritten = 0usize;
    for (month, tool, value) in fresh.cells() {
        if merged.get(month, tool).is_some() {
            overwritten += 1;
        }
        merged.insert(month, tool, value);
    }

    debug!(
        history_months = history.month_count(),
        fresh_months = fresh.month_count(),
        merged_months = merged.month_count(),
        overwritten,
        "Merged fresh observations into history"
    );
    merged
}
