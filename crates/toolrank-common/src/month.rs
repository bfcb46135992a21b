//! Calendar-month keys.
//!
//! Every table in toolrank is indexed by month. A `MonthKey` is always
//! normalised to the first day of its month, so two keys are equal exactly
//! when they name the same calendar month.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ToolrankError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// Build a key from a year and a 1-based month. Returns None for month outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Truncate any calendar date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// The month containing today's date (UTC).
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Last calendar day of the month (28–31).
    pub fn last_day(&self) -> NaiveDate {
        self.succ().0.pred_opt().unwrap_or(self.0)
    }

    /// The following month. Saturates at the end of chrono's date range.
    pub fn succ(&self) -> Self {
        self.0.checked_add_months(Months::new(1)).map(Self).unwrap_or(*self)
    }

    /// Short `YYYY-MM` label used in reports.
    pub fn label(&self) -> String {
        self.0.format("%Y-%m").to_string()
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for MonthKey {
    type Err = ToolrankError;

    /// Accepts `YYYY-MM`, `YYYY-MM-DD`, or a timestamp whose first ten
    /// characters are `YYYY-MM-DD`. The day is discarded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.get(..10) {
            Some(prefix) => NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok(),
            None => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok(),
        };
        parsed
            .map(Self::from_date)
            .ok_or_else(|| ToolrankError::InvalidMonth(s.to_string()))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_forms() {
        let expected = MonthKey::new(2024, 3).unwrap();
        assert_eq!("2024-03".parse::<MonthKey>().unwrap(), expected);
        assert_eq!("2024-03-01".parse::<MonthKey>().unwrap(), expected);
        assert_eq!("2024-03-17".parse::<MonthKey>().unwrap(), expected);
        assert_eq!("2024-03-17 00:00:00".parse::<MonthKey>().unwrap(), expected);
        assert!("March 2024".parse::<MonthKey>().is_err());
        assert!("2024-13".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_display_is_first_day() {
        let m = MonthKey::from_date(NaiveDate::from_ymd_opt(2023, 11, 29).unwrap());
        assert_eq!(m.to_string(), "2023-11-01");
        assert_eq!(m.label(), "2023-11");
    }

    #[test]
    fn test_month_stepping_crosses_years() {
        let dec = MonthKey::new(2023, 12).unwrap();
        assert_eq!(dec.succ(), MonthKey::new(2024, 1).unwrap());
        assert_eq!(dec.succ().succ(), MonthKey::new(2024, 2).unwrap());
    }

    #[test]
    fn test_last_day_handles_leap_years() {
        assert_eq!(MonthKey::new(2024, 2).unwrap().last_day().day(), 29);
        assert_eq!(MonthKey::new(2023, 2).unwrap().last_day().day(), 28);
        assert_eq!(MonthKey::new(2023, 12).unwrap().last_day().day(), 31);
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = MonthKey::new(2023, 12).unwrap();
        let b = MonthKey::new(2024, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let m = MonthKey::new(2022, 7).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"2022-07-01\"");
        let back: MonthKey = serde_json::from_str("\"2022-07\"").unwrap();
        assert_eq!(back, m);
    }
}
