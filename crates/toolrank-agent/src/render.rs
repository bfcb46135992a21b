//! Plain-text rendering of leaderboards, rank views and refresh summaries.

use std::fmt::Write;

use toolrank_ranker::{Leaderboard, RankView};

use crate::pipeline::RefreshReport;

pub fn render_leaderboard(board: &Leaderboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", board.category, board.month.label());
    if board.entries.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }
    let width = board.entries.iter().map(|e| e.tool.chars().count()).max().unwrap_or(0);
    for entry in &board.entries {
        let _ = writeln!(
            out,
            "  {:>2}. {:<width$}  {:.3}  (rank {})",
            entry.position, entry.tool, entry.score, entry.rank
        );
    }
    out
}

pub fn render_rank_view(view: &RankView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.category);
    if view.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }

    let tools = view.history.columns();
    let _ = write!(out, "  {:<8}", "month");
    for tool in tools {
        let _ = write!(out, " {:>12}", truncate(tool, 12));
    }
    let _ = writeln!(out);
    for month in view.history.months() {
        let _ = write!(out, "  {:<8}", month.label());
        for tool in tools {
            match view.history.get(month, tool) {
                Some(rank) => { let _ = write!(out, " {:>12.1}", rank); }
                None => { let _ = write!(out, " {:>12}", "-"); }
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "  current:");
    for c in &view.current {
        let _ = writeln!(out, "    {:>2}  {}", c.rank, c.tool);
    }
    out
}

pub fn render_summary(report: &RefreshReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "run {} ({} → {})", report.run_id, report.start.label(), report.end.label());
    let _ = writeln!(
        out,
        "  trends: {} tools × {} months, pageviews: {} tools × {} months, scores: {} months",
        report.trends.columns().len(),
        report.trends.month_count(),
        report.pageviews.columns().len(),
        report.pageviews.month_count(),
        report.scores.month_count(),
    );
    if !report.warnings.is_empty() {
        let _ = writeln!(out, "  {} warning(s):", report.warnings.len());
        for w in &report.warnings {
            let _ = writeln!(out, "    - {w}");
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrank_common::{Category, Table};
    use toolrank_ranker::{build_leaderboard, build_rank_view, RankTable, RankViewOptions};
    use toolrank_test_utils::{month, table};

    #[test]
    fn test_leaderboard_lists_positions() {
        let scores = table(&[("2024-02", &[("Cursor", Some(0.9)), ("Replit", Some(0.4))])]);
        let board = build_leaderboard(&scores, &Category::new("Dev", ["Replit", "Cursor"]), 5).unwrap();
        let text = render_leaderboard(&board);
        assert!(text.starts_with("Dev [2024-02]"));
        assert!(text.contains(" 1. Cursor"));
        assert!(text.contains(" 2. Replit"));
    }

    #[test]
    fn test_empty_rank_view_says_no_data() {
        let view = build_rank_view("Ops", &RankTable::new(), &RankViewOptions::default());
        assert!(render_rank_view(&view).contains("(no data)"));
    }

    #[test]
    fn test_rank_view_marks_missing_ranks() {
        let mut ranks: RankTable = Table::new();
        ranks.insert(month("2024-01"), "A", 1);
        ranks.insert(month("2024-02"), "A", 2);
        ranks.insert(month("2024-02"), "B", 1);
        let view = build_rank_view("Cat", &ranks, &RankViewOptions::default());
        let text = render_rank_view(&view);
        assert!(text.contains("2024-01"));
        assert!(text.contains(" -"));
        assert!(text.contains("     1  B"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 12), "short");
        assert_eq!(truncate("Microsoft Copilot Studio", 8), "Microso…");
    }
}
