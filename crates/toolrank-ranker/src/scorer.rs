//! Composite popularity score computation.
//!
//! score(month, tool) = w_trends × n_trends + w_pageviews × n_pageviews
//!
//! where each n is the tool's signal normalised over that source's full
//! history (see `normalise`). A signal missing for a cell contributes 0, so
//! a tool seen by only one source is scored on that source alone, scaled by
//! its weight.

use std::collections::BTreeSet;

use toolrank_common::{Table, ToolName};
use tracing::{debug, warn};

use crate::normalise::Normalisation;
use crate::weights::SignalWeights;

/// Combine one cell's normalised signals. Absent signals contribute 0.
pub fn composite_score(
    trends_norm: Option<f64>,
    pageviews_norm: Option<f64>,
    weights: &SignalWeights,
) -> f64 {
    weights.trends * trends_norm.unwrap_or(0.0) + weights.pageviews * pageviews_norm.unwrap_or(0.0)
}

/// Build the score table from the bounded (`trends`) and unbounded
/// (`pageviews`) signal histories.
///
/// Tools are the union of both column sets, sorted by name; months are the
/// union of both month sets. Every (month, tool) cell of the result holds a
/// score.
pub fn compose_scores(trends: &Table, pageviews: &Table, weights: &SignalWeights) -> Table {
    if !weights.validate() {
        warn!(
            trends = weights.trends,
            pageviews = weights.pageviews,
            "Signal weights do not sum to 1.0; scores are not on a unit scale"
        );
    }

    let trends_norm = Normalisation::MinMax.apply_table(trends);
    let pageviews_norm = Normalisation::ZScoreMinMax.apply_table(pageviews);

    let tools: BTreeSet<&ToolName> = trends.columns().iter().chain(pageviews.columns()).collect();
    let months: BTreeSet<_> = trends.months().chain(pageviews.months()).collect();

    let mut scores = Table::with_columns(tools.iter().map(|t| t.to_string()));
    for &month in &months {
        for tool in &tools {
            let score = composite_score(
                trends_norm.get(month, tool),
                pageviews_norm.get(month, tool),
                weights,
            );
            scores.insert(month, tool, score);
        }
    }

    debug!(
        tools = tools.len(),
        months = months.len(),
        "Composed popularity scores"
    );
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrank_test_utils::{assert_close, month, series_table, table};

    #[test]
    fn test_bounded_only_scenario() {
        let trends = table(&[
            ("2024-01", &[("A", Some(50.0)), ("B", Some(100.0))]),
            ("2024-02", &[("A", Some(80.0)), ("B", Some(100.0))]),
        ]);
        let scores = compose_scores(&trends, &Table::new(), &SignalWeights::default());

        assert_close(scores.get(month("2024-01"), "A").unwrap(), 0.0);
        assert_close(scores.get(month("2024-02"), "A").unwrap(), 0.6);
        assert_close(scores.get(month("2024-01"), "B").unwrap(), 0.0);
        assert_close(scores.get(month("2024-02"), "B").unwrap(), 0.0);
    }

    #[test]
    fn test_missing_pageview_column_contributes_exactly_zero() {
        let trends = series_table("A", "2024-01", &[Some(10.0), Some(40.0), Some(30.0)]);
        let pageviews = series_table("Other", "2024-01", &[Some(5.0), Some(9.0), Some(1.0)]);
        let weights = SignalWeights::new(0.6, 0.4);
        let scores = compose_scores(&trends, &pageviews, &weights);

        let normed = Normalisation::MinMax.apply(&trends.column_values("A"));
        for (i, m) in trends.months().enumerate() {
            assert_eq!(scores.get(m, "A"), Some(0.6 * normed[i].unwrap()));
        }
    }

    #[test]
    fn test_both_signals_combine() {
        let trends = series_table("A", "2024-01", &[Some(0.0), Some(100.0)]);
        let pageviews = series_table("A", "2024-01", &[Some(1_000.0), Some(500.0)]);
        let scores = compose_scores(&trends, &pageviews, &SignalWeights::default());
        // Jan: 0.6*0 + 0.4*1, Feb: 0.6*1 + 0.4*0
        assert_close(scores.get(month("2024-01"), "A").unwrap(), 0.4);
        assert_close(scores.get(month("2024-02"), "A").unwrap(), 0.6);
    }

    #[test]
    fn test_universe_is_union_of_tools_and_months() {
        let trends = series_table("B", "2024-01", &[Some(1.0)]);
        let pageviews = series_table("A", "2024-02", &[Some(3.0)]);
        let scores = compose_scores(&trends, &pageviews, &SignalWeights::default());

        assert_eq!(scores.columns(), &["A".to_string(), "B".to_string()]);
        assert_eq!(scores.month_count(), 2);
        // absent everywhere still scores 0, never null
        assert_eq!(scores.get(month("2024-01"), "A"), Some(0.0));
        assert_eq!(scores.get(month("2024-02"), "B"), Some(0.0));
    }

    #[test]
    fn test_normalisation_uses_full_history() {
        // the spike in 2023 defines the top of A's band
        let trends = series_table("A", "2023-11", &[Some(100.0), Some(0.0), Some(50.0)]);
        let scores = compose_scores(&trends, &Table::new(), &SignalWeights::new(1.0, 0.0));
        assert_close(scores.get(month("2024-01"), "A").unwrap(), 0.5);
    }

    #[test]
    fn test_empty_inputs_give_empty_scores() {
        let scores = compose_scores(&Table::new(), &Table::new(), &SignalWeights::default());
        assert!(scores.is_empty());
    }
}
