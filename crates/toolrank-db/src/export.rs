//! Flat-file exports of rank views and tables.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toolrank_common::{slugify, Table};
use tracing::info;

use crate::codec::{write_table, CellValue};
use crate::error::Result;

/// `rank_history_<category>.csv`, with the category name slugified.
pub fn rank_history_file_name(category: &str) -> String {
    format!("rank_history_{}.csv", slugify(category))
}

/// `rank_points_<category>.csv`: the rank history as `month,tool,rank` rows.
pub fn rank_points_file_name(category: &str) -> String {
    format!("rank_points_{}.csv", slugify(category))
}

/// `current_rank_<category>.csv`
pub fn current_rank_file_name(category: &str) -> String {
    format!("current_rank_{}.csv", slugify(category))
}

/// Write serializable rows as CSV with a header derived from the field names.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `rows` to `path`, creating parent directories.
pub fn export_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    ensure_parent(path)?;
    write_rows(File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Exported rows");
    Ok(path.to_path_buf())
}

/// Write a whole table to `path` in the history CSV layout.
pub fn export_table<V: CellValue>(path: &Path, table: &Table<V>) -> Result<PathBuf> {
    ensure_parent(path)?;
    write_table(File::create(path)?, table)?;
    info!(path = %path.display(), months = table.month_count(), "Exported table");
    Ok(path.to_path_buf())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrank_common::MonthKey;
    use toolrank_test_utils::{assert_eq, month};

    #[derive(Serialize)]
    struct Point {
        month: MonthKey,
        tool: String,
        rank: Option<f64>,
    }

    #[test]
    fn test_file_names() {
        assert_eq!(rank_history_file_name("4. Development"), "rank_history_4._Development.csv");
        assert_eq!(current_rank_file_name("Design & Media"), "current_rank_Design_&_Media.csv");
        assert_eq!(rank_points_file_name("Ops / Infra"), "rank_points_Ops___Infra.csv");
    }

    #[test]
    fn test_long_format_rows() {
        let rows = vec![
            Point { month: month("2024-01"), tool: "A".into(), rank: Some(1.5) },
            Point { month: month("2024-02"), tool: "A".into(), rank: None },
        ];
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "month,tool,rank\n2024-01-01,A,1.5\n2024-02-01,A,\n"
        );
    }

    #[test]
    fn test_export_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(rank_history_file_name("Ops"));
        let mut ranks: Table<u32> = Table::new();
        ranks.insert(month("2024-01"), "A", 1);

        let written = export_table(&path, &ranks).unwrap();
        assert_eq!(fs::read_to_string(written).unwrap(), "month,A\n2024-01-01,1\n");
    }
}
