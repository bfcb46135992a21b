//! Sparse monthly tables.
//!
//! A `Table` maps each month to the observed value of each tool. Cells are
//! nullable: a missing cell means "no observation that month", which is
//! different from an observed zero. The column set is tracked explicitly and
//! in insertion order, so a tool can be present in a table while every one of
//! its cells is null (e.g. a pageview lookup that found no document).
//!
//! Structure:
//! - `columns`: ordered, duplicate-free tool names
//! - `rows`: month → (tool → value), months ascending
//!
//! The cell type defaults to `f64` (signals and scores); rank tables use
//! `u32` so that a rank is always a whole number or absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

/// Opaque tool identifier. Matching is exact (case and whitespace sensitive).
pub type ToolName = String;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table<V = f64> {
    columns: Vec<ToolName>,
    rows: BTreeMap<MonthKey, BTreeMap<ToolName, V>>,
}

impl<V: Copy> Table<V> {
    pub fn new() -> Self {
        Self { columns: Vec::new(), rows: BTreeMap::new() }
    }

    /// Create an empty table with a fixed column order and no months.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ToolName>,
    {
        let mut table = Self::new();
        for col in columns {
            table.add_column(col);
        }
        table
    }

    /// Append a column if it is not already present.
    pub fn add_column(&mut self, tool: impl Into<ToolName>) {
        let tool = tool.into();
        if !self.has_column(&tool) {
            self.columns.push(tool);
        }
    }

    /// Ensure a month row exists, even if every cell in it stays null.
    pub fn add_month(&mut self, month: MonthKey) {
        self.rows.entry(month).or_default();
    }

    /// Set or clear a cell. Registers the month and column as a side effect.
    pub fn set(&mut self, month: MonthKey, tool: &str, value: Option<V>) {
        self.add_column(tool);
        let row = self.rows.entry(month).or_default();
        match value {
            Some(v) => {
                row.insert(tool.to_string(), v);
            }
            None => {
                row.remove(tool);
            }
        }
    }

    /// Shorthand for `set(month, tool, Some(value))`.
    pub fn insert(&mut self, month: MonthKey, tool: &str, value: V) {
        self.set(month, tool, Some(value));
    }

    pub fn get(&self, month: MonthKey, tool: &str) -> Option<V> {
        self.rows.get(&month).and_then(|row| row.get(tool)).copied()
    }

    pub fn columns(&self) -> &[ToolName] {
        &self.columns
    }

    pub fn has_column(&self, tool: &str) -> bool {
        self.columns.iter().any(|c| c == tool)
    }

    /// Months in ascending order.
    pub fn months(&self) -> impl Iterator<Item = MonthKey> + '_ {
        self.rows.keys().copied()
    }

    pub fn month_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_month(&self, month: MonthKey) -> bool {
        self.rows.contains_key(&month)
    }

    /// Non-null cells of one month, keyed by tool.
    pub fn row(&self, month: MonthKey) -> Option<&BTreeMap<ToolName, V>> {
        self.rows.get(&month)
    }

    pub fn first_month(&self) -> Option<MonthKey> {
        self.rows.keys().next().copied()
    }

    pub fn latest_month(&self) -> Option<MonthKey> {
        self.rows.keys().next_back().copied()
    }

    /// A table is empty when it has no months or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Values of one tool aligned with `months()`. Absent cells are `None`.
    pub fn column_values(&self, tool: &str) -> Vec<Option<V>> {
        self.rows.values().map(|row| row.get(tool).copied()).collect()
    }

    /// Replace a column with values aligned with `months()`.
    /// Extra values are ignored; missing trailing values are treated as null.
    pub fn set_column_values(&mut self, tool: &str, values: &[Option<V>]) {
        self.add_column(tool);
        let months: Vec<MonthKey> = self.months().collect();
        for (i, month) in months.into_iter().enumerate() {
            self.set(month, tool, values.get(i).copied().flatten());
        }
    }

    /// All non-null cells as (month, tool, value), months ascending then column order.
    pub fn cells(&self) -> impl Iterator<Item = (MonthKey, &str, V)> + '_ {
        self.rows.iter().flat_map(move |(month, row)| {
            self.columns
                .iter()
                .filter_map(move |col| row.get(col).map(|v| (*month, col.as_str(), *v)))
        })
    }

    /// The most recent `n` months (all months if fewer exist). Columns are kept.
    pub fn tail(&self, n: usize) -> Table<V> {
        let skip = self.rows.len().saturating_sub(n);
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .skip(skip)
                .map(|(m, row)| (*m, row.clone()))
                .collect(),
        }
    }

    /// Months within `[start, end]` inclusive. Columns are kept.
    pub fn between(&self, start: MonthKey, end: MonthKey) -> Table<V> {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .range(start..=end)
                .map(|(m, row)| (*m, row.clone()))
                .collect(),
        }
    }

    /// Restrict to the given columns, in the given order. Unknown names are
    /// skipped rather than null-padded. All months are kept.
    pub fn select<S: AsRef<str>>(&self, tools: &[S]) -> Table<V> {
        let mut columns: Vec<ToolName> = Vec::new();
        for tool in tools {
            let tool = tool.as_ref();
            if self.has_column(tool) && !columns.iter().any(|c| c == tool) {
                columns.push(tool.to_string());
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|(m, row)| {
                let kept = row
                    .iter()
                    .filter(|(tool, _)| columns.contains(*tool))
                    .map(|(tool, v)| (tool.clone(), *v))
                    .collect();
                (*m, kept)
            })
            .collect();
        Table { columns, rows }
    }

    /// Outer join on month: union of months, columns of `self` followed by the
    /// new columns of `other`. Where both tables hold a cell, `self` wins.
    pub fn outer_join(&self, other: &Table<V>) -> Table<V> {
        let mut joined = self.clone();
        for col in &other.columns {
            joined.add_column(col.clone());
        }
        for (month, row) in &other.rows {
            let target = joined.rows.entry(*month).or_default();
            for (tool, value) in row {
                target.entry(tool.clone()).or_insert(*value);
            }
        }
        joined
    }

    /// Apply `f` to every non-null cell, keeping months and columns.
    pub fn map_values<U, F>(&self, f: F) -> Table<U>
    where
        U: Copy,
        F: Fn(V) -> U,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|(m, row)| (*m, row.iter().map(|(t, v)| (t.clone(), f(*v))).collect()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn m(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn test_column_presence_is_independent_of_cells() {
        let mut t: Table = Table::new();
        t.add_month(m(2024, 1));
        t.set(m(2024, 1), "Cursor", None);
        assert!(t.has_column("Cursor"));
        assert_eq!(t.get(m(2024, 1), "Cursor"), None);
        assert_eq!(t.cells().count(), 0);
    }

    #[test]
    fn test_months_are_sorted() {
        let mut t: Table = Table::new();
        t.insert(m(2024, 3), "A", 1.0);
        t.insert(m(2023, 12), "A", 2.0);
        t.insert(m(2024, 1), "A", 3.0);
        let months: Vec<_> = t.months().collect();
        assert_eq!(months, vec![m(2023, 12), m(2024, 1), m(2024, 3)]);
        assert_eq!(t.latest_month(), Some(m(2024, 3)));
        assert_eq!(t.first_month(), Some(m(2023, 12)));
    }

    #[test]
    fn test_map_values_changes_cell_type() {
        let mut ranks: Table<u32> = Table::with_columns(["A", "B"]);
        ranks.insert(m(2024, 1), "A", 2);
        ranks.add_month(m(2024, 2));
        let floats: Table<f64> = ranks.map_values(f64::from);
        assert_eq!(floats.get(m(2024, 1), "A"), Some(2.0));
        assert_eq!(floats.columns(), ranks.columns());
        assert_eq!(floats.month_count(), 2);
    }

    #[test]
    fn test_column_values_align_with_months() {
        let mut t: Table = Table::new();
        t.insert(m(2024, 1), "A", 1.0);
        t.insert(m(2024, 2), "B", 2.0);
        t.insert(m(2024, 3), "A", 3.0);
        assert_eq!(t.column_values("A"), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(t.column_values("missing"), vec![None, None, None]);
    }

    #[test]
    fn test_tail_keeps_most_recent_months() {
        let mut t: Table = Table::new();
        for month in 1..=6 {
            t.insert(m(2024, month), "A", month as f64);
        }
        let tail = t.tail(2);
        assert_eq!(tail.months().collect::<Vec<_>>(), vec![m(2024, 5), m(2024, 6)]);
        assert_eq!(t.tail(10).month_count(), 6);
    }

    #[test]
    fn test_select_skips_unknown_columns_and_keeps_order() {
        let mut t: Table = Table::with_columns(["A", "B", "C"]);
        t.insert(m(2024, 1), "A", 1.0);
        t.insert(m(2024, 1), "C", 3.0);
        let sub = t.select(&["C", "Z", "A"]);
        assert_eq!(sub.columns(), &["C".to_string(), "A".to_string()]);
        assert_eq!(sub.get(m(2024, 1), "C"), Some(3.0));
        assert_eq!(sub.get(m(2024, 1), "B"), None);
    }

    #[test]
    fn test_outer_join_unions_months_and_columns() {
        let mut left: Table = Table::new();
        left.insert(m(2024, 1), "A", 1.0);
        let mut right: Table = Table::new();
        right.insert(m(2024, 2), "B", 2.0);
        right.insert(m(2024, 1), "A", 9.0);

        let joined = left.outer_join(&right);
        assert_eq!(joined.columns(), &["A".to_string(), "B".to_string()]);
        assert_eq!(joined.get(m(2024, 1), "A"), Some(1.0));
        assert_eq!(joined.get(m(2024, 2), "B"), Some(2.0));
        assert_eq!(joined.get(m(2024, 2), "A"), None);
    }

    #[test]
    fn test_cells_iterate_in_column_order() {
        let mut t: Table = Table::with_columns(["B", "A"]);
        t.insert(m(2024, 1), "A", 1.0);
        t.insert(m(2024, 1), "B", 2.0);
        let cells: Vec<_> = t.cells().map(|(_, tool, v)| (tool.to_string(), v)).collect();
        assert_eq!(cells, vec![("B".to_string(), 2.0), ("A".to_string(), 1.0)]);
    }

    #[test]
    fn test_empty_table() {
        assert!(Table::<f64>::new().is_empty());
        assert!(Table::<f64>::with_columns(["A"]).is_empty());
        let mut t: Table = Table::new();
        t.add_month(m(2024, 1));
        assert!(t.is_empty());
    }
}
