//! CSV encoding of monthly tables.
//!
//! Layout: a header row `month,<tool>,<tool>,...`, then one row per month in
//! ascending order with the month written as `YYYY-MM-DD`. An empty cell is a
//! null. Column order is preserved, so a column whose cells are all null
//! survives a save/load cycle.

use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;

use toolrank_common::{MonthKey, Table};

use crate::error::{DbError, Result};

/// Header of the month column.
pub const MONTH_COLUMN: &str = "month";

/// A value that can live in a persisted table cell.
pub trait CellValue: Copy + Display + FromStr {
    /// Values failing this check are read back as null.
    fn is_storable(&self) -> bool {
        true
    }
}

impl CellValue for f64 {
    fn is_storable(&self) -> bool {
        self.is_finite()
    }
}

impl CellValue for u32 {}

/// Write `table` as CSV.
pub fn write_table<W: Write, V: CellValue>(writer: W, table: &Table<V>) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(MONTH_COLUMN.to_string());
    header.extend(table.columns().iter().cloned());
    out.write_record(&header)?;

    for month in table.months() {
        let mut record = Vec::with_capacity(header.len());
        record.push(month.to_string());
        for tool in table.columns() {
            record.push(match table.get(month, tool) {
                Some(v) if v.is_storable() => v.to_string(),
                _ => String::new(),
            });
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Read a table written by [`write_table`].
///
/// The first column is taken as the month whatever its header says, so
/// exports that label it `date` load too.
pub fn read_table<R: Read, V: CellValue>(reader: R) -> Result<Table<V>> {
    let mut input = csv::Reader::from_reader(reader);

    let headers = input.headers()?.clone();
    if headers.is_empty() {
        return Err(DbError::MissingHeader { expected: MONTH_COLUMN });
    }
    let tools: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();
    let mut table = Table::with_columns(tools.iter().cloned());

    for result in input.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_month = record.get(0).unwrap_or("").trim();
        if raw_month.is_empty() {
            continue;
        }
        let month = MonthKey::from_str(raw_month).map_err(|_| DbError::InvalidMonth {
            value: raw_month.to_string(),
            line,
        })?;
        table.add_month(month);

        for (tool, raw) in tools.iter().zip(record.iter().skip(1)) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let value: V = raw.parse().map_err(|_| DbError::InvalidValue {
                tool: tool.clone(),
                value: raw.to_string(),
                line,
            })?;
            if value.is_storable() {
                table.insert(month, tool, value);
            }
        }
    }

    Ok(table)
}
