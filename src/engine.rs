//! Forecast pipeline: extract, gate, select, refit, assemble
//!
//! One `ForecastEngine` wraps the immutable dataset and configuration and
//! serves independent, stateless forecast calls. Nothing is cached between
//! calls; replacing the dataset means building a new engine and swapping it
//! in whole, never mutating in place under concurrent readers.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{error, info};

use crate::catalog::resolve_order;
use crate::config::{EngineConfig, CONFIDENCE_LEVEL};
use crate::data::{Dataset, DelaySeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::selection::select_model;

/// How many trailing actual observations the plot output carries for context.
pub const PLOT_CONTEXT_MONTHS: usize = 12;

/// Headline forecast for one airport, shaped for the response layer.
///
/// Values are rounded to 2 decimal places here, at the presentation boundary;
/// selection and fitting run at full precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub airport: String,
    pub last_observed_month: NaiveDate,
    /// Anchor of the final horizon step
    pub forecast_month: NaiveDate,
    pub horizon: usize,
    /// Point estimate of the final horizon step, in minutes
    pub predicted_avg_delay: f64,
    pub lower_95: f64,
    pub upper_95: f64,
    pub model_used: String,
}

/// One forecast step with its calendar anchor, for the plot layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub month: NaiveDate,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Full per-step forecast plus recent actuals, for the plot layer.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub airport: String,
    pub model_used: String,
    /// Trailing window of observed months
    pub actual_months: Vec<NaiveDate>,
    /// Trailing window of observed values
    pub actual_values: Vec<f64>,
    /// All horizon steps in ascending month order
    pub steps: Vec<ForecastStep>,
}

/// Stateless forecast pipeline over an immutable dataset.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    dataset: Dataset,
    config: EngineConfig,
}

impl ForecastEngine {
    pub fn new(dataset: Dataset, config: EngineConfig) -> Self {
        Self { dataset, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Airports known to the backing dataset.
    pub fn airports(&self) -> Vec<String> {
        self.dataset.airports()
    }

    /// Produce the headline forecast for `airport`, `horizon` months ahead.
    pub fn forecast(&self, airport: &str, horizon: usize) -> Result<ForecastReport> {
        let (series, model_used, result) = self.run_pipeline(airport, horizon)?;

        let predicted = *result.values().last().unwrap_or(&f64::NAN);
        let (lower, upper) = *result.intervals().last().unwrap_or(&(f64::NAN, f64::NAN));
        let forecast_month = month_begin_after(series.last_observed(), horizon)?;

        let report = ForecastReport {
            airport: series.airport().to_string(),
            last_observed_month: series.last_observed(),
            forecast_month,
            horizon,
            predicted_avg_delay: round2(predicted),
            lower_95: round2(lower),
            upper_95: round2(upper),
            model_used,
        };

        info!(
            airport = %report.airport,
            model = %report.model_used,
            horizon,
            predicted = report.predicted_avg_delay,
            "Forecast produced"
        );
        Ok(report)
    }

    /// Produce the full per-step forecast plus recent actuals for plotting.
    pub fn plot_series(&self, airport: &str, horizon: usize) -> Result<PlotSeries> {
        let (series, model_used, result) = self.run_pipeline(airport, horizon)?;

        let mut steps = Vec::with_capacity(horizon);
        for (k, (mean, (lower, upper))) in
            result.values().iter().zip(result.intervals()).enumerate()
        {
            steps.push(ForecastStep {
                month: month_begin_after(series.last_observed(), k + 1)?,
                mean: *mean,
                lower: *lower,
                upper: *upper,
            });
        }

        let (months, values) = series.recent(PLOT_CONTEXT_MONTHS);
        Ok(PlotSeries {
            airport: series.airport().to_string(),
            model_used,
            actual_months: months.to_vec(),
            actual_values: values.to_vec(),
            steps,
        })
    }

    /// Extract, gate, select, refit and forecast. Shared by the response and
    /// plot paths.
    fn run_pipeline(
        &self,
        airport: &str,
        horizon: usize,
    ) -> Result<(DelaySeries, String, ForecastResult)> {
        if horizon < 1 || horizon > self.config.max_horizon {
            return Err(ForecastError::Validation(format!(
                "Horizon must be between 1 and {}, got {}",
                self.config.max_horizon, horizon
            )));
        }

        let series = self.dataset.series(airport)?;

        // Eligibility gate: reject before any fit is attempted, so a short
        // series reads as "not enough history" rather than "fit failed".
        if series.len() < self.config.min_history {
            return Err(ForecastError::InsufficientHistory {
                len: series.len(),
                min: self.config.min_history,
            });
        }

        let selection = select_model(
            series.values(),
            self.config.min_history,
            self.config.max_iterations,
        )?;
        let order = resolve_order(&selection.model)?;

        // Refit on the full series. The candidate already fitted on the
        // truncated series, so a failure here is a genuine numerical problem
        // and must surface rather than be retried or substituted.
        let fitted = ArimaModel::new(order, &selection.model)
            .fit(series.values(), self.config.max_iterations)
            .map_err(|e| {
                error!(
                    airport = %series.airport(),
                    model = %selection.model,
                    "Refit on full series failed: {}",
                    e
                );
                e
            })?;

        let result = fitted.forecast(horizon, CONFIDENCE_LEVEL)?;
        Ok((series, selection.model, result))
    }
}

/// First day of the month `months` calendar months after `date`.
pub fn month_begin_after(date: NaiveDate, months: usize) -> Result<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)
        .ok_or_else(|| ForecastError::Validation(format!("Month arithmetic overflow from {}", date)))
}

/// Round to 2 decimal places at the presentation boundary.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn month_anchor_advances_within_year() {
        assert_eq!(
            month_begin_after(month(2024, 3), 2).unwrap(),
            month(2024, 5)
        );
    }

    #[test]
    fn month_anchor_rolls_over_year_boundary() {
        assert_eq!(
            month_begin_after(month(2024, 11), 2).unwrap(),
            month(2025, 1)
        );
        assert_eq!(
            month_begin_after(month(2024, 12), 1).unwrap(),
            month(2025, 1)
        );
    }

    #[test]
    fn round2_is_presentation_rounding() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(-3.014), -3.01);
        assert_eq!(round2(9.1), 9.1);
    }
}
