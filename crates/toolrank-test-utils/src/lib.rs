//! Fixture builders shared by the toolrank test suites.

use toolrank_common::{MonthKey, Table};

pub use pretty_assertions::assert_eq;

/// Month key from a `YYYY-MM` literal. Panics on malformed input.
pub fn month(label: &str) -> MonthKey {
    label.parse().unwrap_or_else(|e| panic!("bad month fixture {label:?}: {e}"))
}

/// Build a table from `(month, [(tool, value)])` rows. `None` registers the
/// tool column without a value for that month.
pub fn table(rows: &[(&str, &[(&str, Option<f64>)])]) -> Table {
    let mut t = Table::new();
    for (label, cells) in rows {
        let m = month(label);
        t.add_month(m);
        for (tool, value) in cells.iter() {
            t.set(m, tool, *value);
        }
    }
    t
}

/// Build a single-tool table from consecutive months starting at `start`.
pub fn series_table(tool: &str, start: &str, values: &[Option<f64>]) -> Table {
    let mut t = Table::with_columns([tool]);
    let mut m = month(start);
    for value in values {
        t.add_month(m);
        t.set(m, tool, *value);
        m = m.succ();
    }
    t
}

/// Assert two floats agree to within `1e-9`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Assert two optional series agree element-wise to within `1e-9`.
#[track_caller]
pub fn assert_series_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
    assert_eq!(actual.len(), expected.len(), "series length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        match (a, e) {
            (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "index {i}: expected {e}, got {a}"),
            (None, None) => {}
            _ => panic!("index {i}: expected {e:?}, got {a:?}"),
        }
    }
}
