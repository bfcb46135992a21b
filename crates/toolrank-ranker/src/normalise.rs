//! Score normalisation functions.
//!
//! Each tool's series is rescaled against its own history, so a normalised
//! value answers "is this tool high or low relative to itself", not "which
//! tool has the largest signal". Series are month-aligned slices where
//! `None` means no observation.

use serde::{Deserialize, Serialize};
use toolrank_common::Table;

/// Which normalisation a signal receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    /// Plain min-max. Used for the bounded (0–100) search-interest index.
    MinMax,
    /// Z-score first, then min-max. Used for unbounded absolute counts,
    /// which are heavily right-skewed across months.
    ZScoreMinMax,
}

impl Normalisation {
    pub fn apply(self, series: &[Option<f64>]) -> Vec<Option<f64>> {
        match self {
            Normalisation::MinMax => minmax_normalise(series),
            Normalisation::ZScoreMinMax => minmax_normalise(&zscore_normalise(series)),
        }
    }

    /// Normalise every column of `table` independently.
    pub fn apply_table(self, table: &Table) -> Table {
        let mut out = table.clone();
        for tool in table.columns() {
            let normed = self.apply(&table.column_values(tool));
            out.set_column_values(tool, &normed);
        }
        out
    }
}

/// Min-max normalisation: `(x - min) / (max - min)` over the observed values.
///
/// - No observed values → returned unchanged (absence propagates).
/// - Constant series (including a single observation) → every observed
///   value becomes 0.
pub fn minmax_normalise(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some((min, max)) = observed_range(series) else {
        return series.to_vec();
    };
    if max == min {
        return zero_fill(series);
    }
    series
        .iter()
        .map(|v| v.map(|x| (x - min) / (max - min)))
        .collect()
}

/// Z-score normalisation with the population standard deviation.
///
/// No observed values → unchanged; zero deviation → all observed values 0.
pub fn zscore_normalise(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let observed: Vec<f64> = series.iter().flatten().copied().collect();
    if observed.is_empty() {
        return series.to_vec();
    }
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let variance = observed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let sd = variance.sqrt();
    if sd == 0.0 {
        return zero_fill(series);
    }
    series
        .iter()
        .map(|v| v.map(|x| (x - mean) / sd))
        .collect()
}

fn observed_range(series: &[Option<f64>]) -> Option<(f64, f64)> {
    series.iter().flatten().fold(None, |acc, &x| match acc {
        None => Some((x, x)),
        Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
    })
}

fn zero_fill(series: &[Option<f64>]) -> Vec<Option<f64>> {
    series.iter().map(|v| v.map(|_| 0.0)).collect()
}
