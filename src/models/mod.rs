//! Forecasting models for monthly time series

use std::fmt::Debug;

use crate::error::{ForecastError, Result};

/// Forecast result: point estimates plus a two-sided interval per step.
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Forecasted mean values, one per horizon step
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
    /// (lower, upper) interval bounds, one pair per step
    intervals: Vec<(f64, f64)>,
}

impl ForecastResult {
    /// Create a new forecast result with interval bounds.
    pub fn new(values: Vec<f64>, horizons: usize, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::Validation(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }
        if intervals.len() != horizons {
            return Err(ForecastError::Validation(format!(
                "Intervals length ({}) doesn't match horizons ({})",
                intervals.len(),
                horizons
            )));
        }

        Ok(Self {
            values,
            horizons,
            intervals,
        })
    }

    /// Get the forecasted mean values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Get the interval bounds
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }
}

/// Fitted model able to forecast future periods.
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizon` future periods with two-sided intervals at the
    /// given confidence level.
    fn forecast(&self, horizon: usize, confidence: f64) -> Result<ForecastResult>;

    /// Stable name of the model configuration
    fn name(&self) -> &str;
}

/// Model configuration that can be fitted to a value series.
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Trained: TrainedForecastModel;

    /// Fit the configuration, bounding the optimizer at `max_iterations`.
    fn fit(&self, values: &[f64], max_iterations: usize) -> Result<Self::Trained>;

    /// Stable name of the model configuration
    fn name(&self) -> &str;
}

pub mod arima;
