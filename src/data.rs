//! Monthly delay dataset and per-airport series extraction
//!
//! The dataset is the cleaned, typed output of the upstream ETL: one row per
//! airport-month with the target metric possibly missing. It is loaded once
//! and treated as immutable for the process lifetime; every forecast call
//! extracts a fresh read-only series from it.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// One airport-month observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRecord {
    /// Airport name (stored uppercased)
    pub airport: String,
    /// First day of the observed month
    pub date: NaiveDate,
    /// Average delay in minutes; `None` when the month has no usable value
    pub avg_delay: Option<f64>,
}

/// Immutable collection of monthly delay records, sorted by (airport, date).
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<DelayRecord>,
}

/// Time-ordered delay series for a single airport, missing values dropped.
#[derive(Debug, Clone)]
pub struct DelaySeries {
    airport: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    last_observed: NaiveDate,
}

impl Dataset {
    /// Build a dataset from typed rows.
    ///
    /// Rows are uppercased, sorted by (airport, date) and deduplicated on the
    /// (airport, date) key, keeping the first occurrence.
    pub fn from_records(records: Vec<DelayRecord>) -> Self {
        let mut records: Vec<DelayRecord> = records
            .into_iter()
            .map(|mut r| {
                r.airport = r.airport.to_uppercase();
                r
            })
            .collect();
        records.sort_by(|a, b| (a.airport.as_str(), a.date).cmp(&(b.airport.as_str(), b.date)));
        records.dedup_by(|a, b| a.airport == b.airport && a.date == b.date);
        Self { records }
    }

    /// Load the cleaned monthly CSV produced by the feature-building step.
    ///
    /// Columns are resolved by header name: `airport`, `date` and the
    /// configured target column. Empty or non-numeric target cells become
    /// missing observations rather than load failures.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, target: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let col = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ForecastError::Data(format!("Column '{}' not found in CSV", name)))
        };
        let airport_idx = col("airport")?;
        let date_idx = col("date")?;
        let target_idx = col(target)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let airport = match row.get(airport_idx) {
                Some(a) if !a.is_empty() => a.to_string(),
                _ => continue,
            };
            let date = row
                .get(date_idx)
                .and_then(|d| d.parse::<NaiveDate>().ok())
                .ok_or_else(|| {
                    ForecastError::Data(format!("Unparseable date for airport {}", airport))
                })?;
            let avg_delay = row
                .get(target_idx)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite());

            records.push(DelayRecord {
                airport,
                date,
                avg_delay,
            });
        }

        Ok(Self::from_records(records))
    }

    /// Sorted unique airport names present in the dataset.
    pub fn airports(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.airport.clone()).collect();
        names.dedup();
        names
    }

    /// Number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Extract the delay series for one airport (case-insensitive match).
    ///
    /// Missing target values are dropped, never interpolated. The last
    /// observed month is the maximum date over all of the airport's rows,
    /// including rows whose target value is missing.
    pub fn series(&self, airport: &str) -> Result<DelaySeries> {
        let wanted = airport.to_uppercase();
        let rows: Vec<&DelayRecord> = self
            .records
            .iter()
            .filter(|r| r.airport == wanted)
            .collect();

        if rows.is_empty() {
            return Err(ForecastError::NotFound(wanted));
        }

        // Rows are already date-sorted within an airport.
        let last_observed = rows.last().map(|r| r.date).unwrap();
        let mut dates = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for r in &rows {
            if let Some(v) = r.avg_delay {
                dates.push(r.date);
                values.push(v);
            }
        }

        Ok(DelaySeries {
            airport: wanted,
            dates,
            values,
            last_observed,
        })
    }
}

impl DelaySeries {
    /// Airport name (uppercased)
    pub fn airport(&self) -> &str {
        &self.airport
    }

    /// Observation values in time order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Month anchors of the observations, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Maximum date present for this airport
    pub fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    /// Number of usable observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series has no usable observations
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Trailing window of up to `n` (date, value) observations, for plotting
    pub fn recent(&self, n: usize) -> (&[NaiveDate], &[f64]) {
        let start = self.len().saturating_sub(n);
        (&self.dates[start..], &self.values[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            DelayRecord {
                airport: "Heathrow".into(),
                date: month(2024, 2),
                avg_delay: Some(12.5),
            },
            DelayRecord {
                airport: "HEATHROW".into(),
                date: month(2024, 1),
                avg_delay: Some(10.0),
            },
            DelayRecord {
                airport: "HEATHROW".into(),
                date: month(2024, 3),
                avg_delay: None,
            },
            DelayRecord {
                airport: "GATWICK".into(),
                date: month(2024, 1),
                avg_delay: Some(8.0),
            },
        ])
    }

    #[test]
    fn airports_are_sorted_and_unique() {
        assert_eq!(sample().airports(), vec!["GATWICK", "HEATHROW"]);
    }

    #[test]
    fn series_is_case_insensitive_and_drops_missing() {
        let s = sample().series("heathrow").unwrap();
        assert_eq!(s.airport(), "HEATHROW");
        assert_eq!(s.values(), &[10.0, 12.5]);
        assert_eq!(s.dates(), &[month(2024, 1), month(2024, 2)]);
        // last observed month counts rows whose value is missing
        assert_eq!(s.last_observed(), month(2024, 3));
    }

    #[test]
    fn unknown_airport_is_not_found() {
        let err = sample().series("STANSTED").unwrap_err();
        assert!(matches!(err, ForecastError::NotFound(a) if a == "STANSTED"));
    }

    #[test]
    fn duplicate_airport_month_rows_are_deduplicated() {
        let ds = Dataset::from_records(vec![
            DelayRecord {
                airport: "LEEDS".into(),
                date: month(2024, 1),
                avg_delay: Some(5.0),
            },
            DelayRecord {
                airport: "LEEDS".into(),
                date: month(2024, 1),
                avg_delay: Some(99.0),
            },
        ]);
        let s = ds.series("LEEDS").unwrap();
        assert_eq!(s.values(), &[5.0]);
    }

    #[test]
    fn recent_returns_trailing_window() {
        let s = sample().series("HEATHROW").unwrap();
        let (dates, values) = s.recent(1);
        assert_eq!(values, &[12.5]);
        assert_eq!(dates, &[month(2024, 2)]);
    }
}
