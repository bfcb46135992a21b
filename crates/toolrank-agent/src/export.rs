//! Per-category export of rank views.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use toolrank_common::{Table, TrackerConfig};
use toolrank_db::{
    current_rank_file_name, export_rows, export_table, rank_history_file_name, rank_points_file_name,
};
use toolrank_ranker::{build_rank_view, RankTable, RankViewOptions};
use tracing::info;

/// Write, for every configured category, its rank history (one row per
/// month, one column per tool), the same history as `month,tool,rank` rows
/// and its current ranking, plus the full score table. Returns the files
/// written. Categories with no data are skipped.
pub fn export_all(
    config: &TrackerConfig,
    scores: &Table,
    ranks: &BTreeMap<String, RankTable>,
    opts: &RankViewOptions,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for category in &config.categories {
        let Some(table) = ranks.get(&category.name) else {
            continue;
        };
        let view = build_rank_view(&category.name, table, opts);
        if view.is_empty() {
            info!(category = %category.name, "No rank data, skipping export");
            continue;
        }
        written.push(export_table(
            &out_dir.join(rank_history_file_name(&category.name)),
            &view.history,
        )?);
        written.push(export_rows(
            &out_dir.join(rank_points_file_name(&category.name)),
            &view.long_format(),
        )?);
        written.push(export_rows(
            &out_dir.join(current_rank_file_name(&category.name)),
            &view.current,
        )?);
    }
    if !scores.is_empty() {
        let name = format!("scores_{}.csv", config.region_label());
        written.push(export_table(&out_dir.join(name), scores)?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrank_common::Category;
    use toolrank_ranker::{build_rank_history, RankMethod};
    use toolrank_test_utils::table;

    #[test]
    fn test_export_writes_wide_long_and_current_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig {
            categories: vec![Category::new("Dev Tools", ["A", "B"]), Category::new("Empty", ["Z"])],
            ..TrackerConfig::default()
        };
        let scores = table(&[
            ("2024-01", &[("A", Some(0.2)), ("B", Some(0.6))]),
            ("2024-02", &[("A", Some(0.9)), ("B", Some(0.1))]),
        ]);
        let ranks = build_rank_history(&scores, &config.categories, RankMethod::Dense);

        let opts = RankViewOptions { lookback_months: None, top_k: 5, smooth: false };
        let files = export_all(&config, &scores, &ranks, &opts, dir.path()).unwrap();
        assert_eq!(files.len(), 4);

        let wide = std::fs::read_to_string(dir.path().join("rank_history_Dev_Tools.csv")).unwrap();
        assert_eq!(wide, "month,A,B\n2024-01-01,2,1\n2024-02-01,1,2\n");

        let long = std::fs::read_to_string(dir.path().join("rank_points_Dev_Tools.csv")).unwrap();
        assert_eq!(
            long,
            "month,tool,rank\n2024-01-01,A,2.0\n2024-02-01,A,1.0\n2024-01-01,B,1.0\n2024-02-01,B,2.0\n"
        );
        let current = std::fs::read_to_string(dir.path().join("current_rank_Dev_Tools.csv")).unwrap();
        assert_eq!(current, "tool,rank\nA,1\nB,2\n");
        assert!(dir.path().join("scores_US.csv").exists());
    }
}
