//! Model run timestamps and the catalog of recent runs offered to the user.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use std::fmt;
use thiserror::Error;

/// Hours between consecutive model runs.
pub const RUN_SPACING_HOURS: u32 = 6;

/// Number of runs listed by [`generate_run_times`].
pub const RUN_CATALOG_LEN: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum RunKeyError {
    #[error("run key must be 10 digits (YYYYMMDDHH), got {0:?}")]
    Malformed(String),
    #[error("run hour {0:02}Z is not on a 6-hour boundary")]
    OffCycle(u32),
}

/// UTC initialization time of a model run, always on a 00/06/12/18Z boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunTime(DateTime<Utc>);

impl RunTime {
    /// Latest run boundary at or before `t`.
    pub fn floor(t: DateTime<Utc>) -> Self {
        let hour = t.hour() - t.hour() % RUN_SPACING_HOURS;
        let naive = t
            .date_naive()
            .and_hms_opt(hour, 0, 0)
            .unwrap_or_else(|| t.naive_utc());
        Self(Utc.from_utc_datetime(&naive))
    }

    /// Parse a compact `YYYYMMDDHH` run key.
    pub fn from_key(key: &str) -> Result<Self, RunKeyError> {
        if key.len() != 10 || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RunKeyError::Malformed(key.to_string()));
        }
        let field = |range: std::ops::Range<usize>| key[range].parse::<u32>().unwrap_or(u32::MAX);
        let naive = NaiveDate::from_ymd_opt(field(0..4) as i32, field(4..6), field(6..8))
            .and_then(|date| date.and_hms_opt(field(8..10), 0, 0))
            .ok_or_else(|| RunKeyError::Malformed(key.to_string()))?;
        if naive.hour() % RUN_SPACING_HOURS != 0 {
            return Err(RunKeyError::OffCycle(naive.hour()));
        }
        Ok(Self(Utc.from_utc_datetime(&naive)))
    }

    pub fn key(&self) -> String {
        self.0.format("%Y%m%d%H").to_string()
    }

    /// Catalog label, e.g. `2024-01-01 00Z`.
    pub fn label(&self) -> String {
        self.0.format("%Y-%m-%d %HZ").to_string()
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Time the forecast at `forecast_hour` applies to.
    pub fn valid_time(&self, forecast_hour: u32) -> DateTime<Utc> {
        self.0 + Duration::hours(i64::from(forecast_hour))
    }

    /// The run `n` cycles before this one.
    pub fn previous(&self, n: u32) -> Self {
        Self(self.0 - Duration::hours(i64::from(n * RUN_SPACING_HOURS)))
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// One selectable entry of the run catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTimeOption {
    pub label: String,
    pub run: RunTime,
    pub latest: bool,
}

impl RunTimeOption {
    pub fn key(&self) -> String {
        self.run.key()
    }
}

/// The most recent [`RUN_CATALOG_LEN`] runs as of `now`, newest first.
pub fn generate_run_times(now: DateTime<Utc>) -> Vec<RunTimeOption> {
    let newest = RunTime::floor(now);
    (0..RUN_CATALOG_LEN as u32)
        .map(|i| {
            let run = newest.previous(i);
            let latest = i == 0;
            let label = if latest {
                format!("{} (Latest)", run.label())
            } else {
                run.label()
            };
            RunTimeOption { label, run, latest }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_catalog_shape() {
        let runs = generate_run_times(utc(2024, 3, 10, 14, 37));
        assert_eq!(runs.len(), 8);
        assert!(runs[0].latest);
        assert!(runs[0].label.ends_with("(Latest)"));
        assert!(runs[1..].iter().all(|r| !r.latest));

        for r in &runs {
            assert!([0, 6, 12, 18].contains(&r.run.datetime().hour()));
            assert_eq!(r.run.datetime().minute(), 0);
        }
        for pair in runs.windows(2) {
            assert_eq!(
                pair[0].run.datetime() - pair[1].run.datetime(),
                Duration::hours(6)
            );
        }
    }

    #[test]
    fn test_catalog_crosses_midnight() {
        let runs = generate_run_times(utc(2024, 1, 1, 3, 0));
        assert_eq!(runs[0].key(), "2024010100");
        assert_eq!(runs[0].label, "2024-01-01 00Z (Latest)");
        assert_eq!(runs[1].key(), "2023123118");
        assert_eq!(runs[7].key(), "2023123006");
    }

    #[test]
    fn test_floor_on_boundary_is_identity() {
        let t = utc(2024, 6, 1, 18, 0);
        assert_eq!(RunTime::floor(t).datetime(), t);
    }

    #[test]
    fn test_from_key() {
        let run = RunTime::from_key("2024010112").unwrap();
        assert_eq!(run.datetime(), utc(2024, 1, 1, 12, 0));
        assert_eq!(run.key(), "2024010112");

        assert_eq!(RunTime::from_key("2024010103"), Err(RunKeyError::OffCycle(3)));
        assert!(matches!(RunTime::from_key("abc"), Err(RunKeyError::Malformed(_))));
        assert!(matches!(
            RunTime::from_key("2024133100"),
            Err(RunKeyError::Malformed(_))
        ));
    }

    #[test]
    fn test_valid_time() {
        let run = RunTime::from_key("2024010100").unwrap();
        assert_eq!(run.valid_time(12), utc(2024, 1, 1, 12, 0));
        assert_eq!(run.valid_time(384), utc(2024, 1, 17, 0, 0));
    }
}
