//! Search-interest index from exported CSV files.
//!
//! The search-interest service has no public API, so the index is read from
//! the CSV files its web UI exports ("Interest over time"). An export looks
//! like:
//!
//! ```text
//! Category: All categories
//!
//! Week,ChatGPT: (United States),Notion: (United States)
//! 2024-01-07,88,12
//! 2024-01-14,91,<1
//! ```
//!
//! Rows may be daily, weekly or monthly; they are averaged into calendar
//! months and rounded to two decimals. An `isPartial` column is ignored.
//!
//! Layout on disk: `<export_dir>/<REGION>/*.csv` for a region, falling back
//! to `<export_dir>/*.csv`. `GLOBAL` is the directory name for worldwide
//! exports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;
use toolrank_common::{MonthKey, Table, ToolName};
use tracing::{debug, info, instrument};

use super::BoundedSignalSource;

/// Header names accepted for the date column.
const DATE_HEADERS: [&str; 5] = ["week", "month", "day", "date", "time"];

/// Value the export uses for "less than one".
const BELOW_ONE: &str = "<1";

pub struct TrendsExportSource {
    export_dir: PathBuf,
}

impl TrendsExportSource {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self { export_dir: export_dir.into() }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Directory holding the exports for `region` (`""` = worldwide).
    pub fn region_dir(&self, region: &str) -> PathBuf {
        let label = if region.is_empty() { "GLOBAL" } else { region };
        let dir = self.export_dir.join(label);
        if dir.is_dir() {
            dir
        } else {
            self.export_dir.clone()
        }
    }

    /// Load and combine every export for `region`. Files are read in name
    /// order; where two files cover the same month and tool, the later
    /// file's value wins.
    pub async fn load_region(&self, region: &str) -> anyhow::Result<Table> {
        let dir = self.region_dir(region);
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("reading export directory {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false) {
                files.push(path);
            }
        }
        if files.is_empty() {
            bail!("no search-interest exports under {}", dir.display());
        }
        files.sort();

        let mut combined = Table::new();
        for path in &files {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let parsed = parse_export(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            debug!(file = %path.display(), tools = parsed.columns().len(), "Loaded export");
            combined = parsed.outer_join(&combined);
        }
        info!(
            dir = %dir.display(),
            files = files.len(),
            tools = combined.columns().len(),
            months = combined.month_count(),
            "Loaded search-interest exports"
        );
        Ok(combined)
    }
}

#[async_trait]
impl BoundedSignalSource for TrendsExportSource {
    fn name(&self) -> &str {
        "trends-export"
    }

    #[instrument(skip(self))]
    async fn fetch(
        &self,
        tools: &[ToolName],
        start: MonthKey,
        end: MonthKey,
        region: &str,
    ) -> anyhow::Result<Table> {
        let all = self.load_region(region).await?;
        Ok(all.between(start, end).select(tools))
    }
}

/// Strip the `: (Region)` suffix the export appends to each term.
fn term_name(header: &str) -> String {
    match header.rfind(": (") {
        Some(idx) if header.ends_with(')') => header[..idx].trim().to_string(),
        _ => header.trim().to_string(),
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == BELOW_ONE {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Parse one export into a monthly table (mean of the rows in each month).
pub fn parse_export(content: &str) -> anyhow::Result<Table> {
    // skip the preamble up to the header row
    let mut offset = None;
    let mut pos = 0;
    for line in content.split_inclusive('\n') {
        let first = line.split(',').next().unwrap_or("").trim().to_ascii_lowercase();
        if line.contains(',') && DATE_HEADERS.contains(&first.as_str()) {
            offset = Some(pos);
            break;
        }
        pos += line.len();
    }
    let Some(offset) = offset else {
        bail!("no header row with a date column");
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content[offset..].as_bytes());
    let headers = reader.headers()?.clone();

    // (column index, tool)
    let columns: Vec<(usize, ToolName)> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, h)| !h.trim().eq_ignore_ascii_case("isPartial"))
        .map(|(i, h)| (i, term_name(h)))
        .collect();

    let mut sums: BTreeMap<(MonthKey, usize), (f64, u32)> = BTreeMap::new();
    let mut months = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(raw_date) = record.get(0).filter(|d| !d.trim().is_empty()) else {
            continue;
        };
        let month: MonthKey = raw_date
            .parse()
            .with_context(|| format!("bad date {raw_date:?}"))?;
        months.push(month);
        for (pos, (idx, _)) in columns.iter().enumerate() {
            if let Some(v) = record.get(*idx).and_then(parse_value) {
                let slot = sums.entry((month, pos)).or_insert((0.0, 0));
                slot.0 += v;
                slot.1 += 1;
            }
        }
    }

    let mut table = Table::with_columns(columns.iter().map(|(_, tool)| tool.clone()));
    for month in months {
        table.add_month(month);
    }
    for ((month, pos), (sum, count)) in sums {
        table.insert(month, &columns[pos].1, round2(sum / f64::from(count)));
    }
    Ok(table)
}
