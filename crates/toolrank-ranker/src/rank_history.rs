//! Per-category rank history.
//!
//! Converts the score table into, for each category, a month-by-month
//! ranking of the category's tools (1 = highest score). Rank tables are a
//! pure view of the score table: they are rebuilt in full on every run and
//! never merged incrementally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use toolrank_common::{Category, Table};
use tracing::debug;

/// Month × tool table of ranks. A null cell means the tool had no score
/// that month; it is never rank 0 or a sentinel.
pub type RankTable = Table<u32>;

/// How tied scores are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMethod {
    /// Ties share a rank; the next distinct score takes the next integer (no gaps).
    #[default]
    Dense,
    /// Ties share the lowest position; gaps follow (competition ranking).
    Min,
    /// Ties share the highest position.
    Max,
    /// Ties share the mean position, rounded half to even.
    Average,
    /// Ties broken by column order.
    First,
}

/// Rank one month's scores, highest first. `None` scores stay unranked.
///
/// Tools are ordered by negated score ascending; equal scores form a tie
/// group resolved by `method`. Input order is the tie-break for `First`.
pub fn rank_values(scores: &[Option<f64>], method: RankMethod) -> Vec<Option<u32>> {
    let mut order: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|v| (i, -v)))
        .collect();
    // stable: equal keys keep input order
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![None; scores.len()];
    let mut dense = 0u32;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && order[end + 1].1 == order[start].1 {
            end += 1;
        }
        dense += 1;
        // 1-based positions of the tie group
        let first_pos = start as u32 + 1;
        let last_pos = end as u32 + 1;
        for (offset, &(idx, _)) in order[start..=end].iter().enumerate() {
            let rank = match method {
                RankMethod::Dense => dense,
                RankMethod::Min => first_pos,
                RankMethod::Max => last_pos,
                RankMethod::Average => round_half_even_mean(first_pos, last_pos),
                RankMethod::First => first_pos + offset as u32,
            };
            ranks[idx] = Some(rank);
        }
        start = end + 1;
    }
    ranks
}

/// Mean of two positions, with .5 rounded to the even neighbour.
fn round_half_even_mean(a: u32, b: u32) -> u32 {
    let sum = a + b;
    let floor = sum / 2;
    if sum % 2 == 0 || floor % 2 == 0 {
        floor
    } else {
        floor + 1
    }
}

/// Rank every month of `scores` for each category.
///
/// - Empty score table → empty mapping.
/// - Columns are the category's tools that exist in `scores`, in category
///   order; tools never scored are skipped, not null-padded.
/// - A category with no matching tools maps to an empty rank table.
pub fn build_rank_history(
    scores: &Table,
    categories: &[Category],
    method: RankMethod,
) -> BTreeMap<String, RankTable> {
    let mut histories = BTreeMap::new();
    if scores.is_empty() {
        return histories;
    }

    for category in categories {
        let sub = scores.select(&category.tools);
        if sub.columns().is_empty() {
            debug!(category = %category.name, "No scored tools in category");
            histories.insert(category.name.clone(), RankTable::new());
            continue;
        }

        let mut ranks = RankTable::with_columns(sub.columns().iter().cloned());
        for month in sub.months() {
            let row: Vec<Option<f64>> = sub.columns().iter().map(|t| sub.get(month, t)).collect();
            ranks.add_month(month);
            for (tool, rank) in sub.columns().iter().zip(rank_values(&row, method)) {
                ranks.set(month, tool, rank);
            }
        }

        debug!(
            category = %category.name,
            tools = ranks.columns().len(),
            months = ranks.month_count(),
            "Built rank history"
        );
        histories.insert(category.name.clone(), ranks);
    }
    histories
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrank_test_utils::{assert_eq, month, table};

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_dense_rank_has_no_gap_after_tie() {
        let ranks = rank_values(&some(&[10.0, 10.0, 7.0, 5.0]), RankMethod::Dense);
        assert_eq!(ranks, vec![Some(1), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_dense_rank_unsorted_input() {
        let ranks = rank_values(&some(&[5.0, 10.0, 7.0, 10.0]), RankMethod::Dense);
        assert_eq!(ranks, vec![Some(3), Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn test_nan_score_does_not_break_ordering() {
        let ranks = rank_values(&[Some(5.0), Some(f64::NAN), Some(7.0), Some(5.0)], RankMethod::Dense);
        assert!(ranks.iter().all(Option::is_some));
        assert!(ranks[2] < ranks[0]);
        assert_eq!(ranks[0], ranks[3]);
    }

    #[test]
    fn test_null_scores_are_unranked() {
        let ranks = rank_values(&[Some(0.3), None, Some(0.9)], RankMethod::Dense);
        assert_eq!(ranks, vec![Some(2), None, Some(1)]);
    }

    #[test]
    fn test_other_tie_methods() {
        let scores = some(&[10.0, 10.0, 7.0, 5.0]);
        assert_eq!(rank_values(&scores, RankMethod::Min), vec![Some(1), Some(1), Some(3), Some(4)]);
        assert_eq!(rank_values(&scores, RankMethod::Max), vec![Some(2), Some(2), Some(3), Some(4)]);
        assert_eq!(rank_values(&scores, RankMethod::First), vec![Some(1), Some(2), Some(3), Some(4)]);
        // mean of positions 1 and 2 is 1.5 → 2
        assert_eq!(rank_values(&scores, RankMethod::Average), vec![Some(2), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_average_rounds_half_to_even() {
        let scores = some(&[9.0, 8.0, 8.0, 1.0]);
        // positions 2 and 3 → 2.5 → 2
        assert_eq!(rank_values(&scores, RankMethod::Average), vec![Some(1), Some(2), Some(2), Some(4)]);
    }

    #[test]
    fn test_method_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&RankMethod::Average).unwrap(), "\"average\"");
        let m: RankMethod = serde_json::from_str("\"min\"").unwrap();
        assert_eq!(m, RankMethod::Min);
        assert_eq!(RankMethod::default(), RankMethod::Dense);
    }

    #[test]
    fn test_rank_history_per_category() {
        let scores = table(&[
            ("2024-01", &[("A", Some(0.0)), ("B", Some(0.0)), ("C", Some(0.2))]),
            ("2024-02", &[("A", Some(0.6)), ("B", Some(0.0)), ("C", None)]),
        ]);
        let categories = vec![
            Category::new("AB", ["A", "B"]),
            Category::new("CZ", ["Z", "C"]),
            Category::new("None", ["Y"]),
        ];
        let ranks = build_rank_history(&scores, &categories, RankMethod::Dense);

        let ab = &ranks["AB"];
        assert_eq!(ab.get(month("2024-01"), "A"), Some(1));
        assert_eq!(ab.get(month("2024-01"), "B"), Some(1));
        assert_eq!(ab.get(month("2024-02"), "A"), Some(1));
        assert_eq!(ab.get(month("2024-02"), "B"), Some(2));

        let cz = &ranks["CZ"];
        assert_eq!(cz.columns(), &["C".to_string()]);
        assert_eq!(cz.get(month("2024-01"), "C"), Some(1));
        assert_eq!(cz.get(month("2024-02"), "C"), None);
        assert_eq!(cz.month_count(), 2);

        assert!(ranks["None"].is_empty());
    }

    #[test]
    fn test_empty_scores_give_empty_mapping() {
        let categories = vec![Category::new("AB", ["A", "B"])];
        assert!(build_rank_history(&Table::new(), &categories, RankMethod::Dense).is_empty());
    }
}
