//! Best-effort audit logging of produced forecasts
//!
//! The audit collaborator receives the same fields as the response layer,
//! after the forecast is already final. Its failures are swallowed at the
//! call site; a logging outage must never break the forecast path.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use crate::engine::ForecastReport;
use crate::error::Result;

/// One audit row, mirroring the response output plus a creation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub created_at: DateTime<Utc>,
    pub airport: String,
    pub last_observed_month: NaiveDate,
    pub forecast_month: NaiveDate,
    pub horizon: usize,
    pub model_used: String,
    pub predicted: f64,
    pub lower_95: f64,
    pub upper_95: f64,
}

impl AuditEntry {
    pub fn from_report(report: &ForecastReport) -> Self {
        Self {
            created_at: Utc::now(),
            airport: report.airport.clone(),
            last_observed_month: report.last_observed_month,
            forecast_month: report.forecast_month,
            horizon: report.horizon,
            model_used: report.model_used.clone(),
            predicted: report.predicted_avg_delay,
            lower_95: report.lower_95,
            upper_95: report.upper_95,
        }
    }
}

/// Destination for audit entries.
pub trait AuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<()>;
}

/// Record a forecast, discarding any sink failure with a warning.
pub fn record_best_effort(sink: &dyn AuditSink, report: &ForecastReport) {
    let entry = AuditEntry::from_report(report);
    if let Err(e) = sink.record(&entry) {
        warn!(airport = %entry.airport, "Audit logging failed (continuing): {}", e);
    }
}

/// Appends audit entries as JSON lines to a local file.
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl AuditSink for JsonlAuditLog {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
