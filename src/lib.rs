//! # Delay Forecast
//!
//! A Rust library for forecasting monthly average flight delay per airport
//! with best-of-3 ARIMA candidate selection and 95% confidence intervals.
//!
//! ## Features
//!
//! - Per-airport monthly delay series extraction from a cleaned dataset
//! - Fixed catalog of ARIMA candidates: (0,1,1), (1,1,0), (1,1,1)
//! - Last-point holdout validation to pick the best candidate per request
//! - Refit on the full series and multi-step forecasts with 95% intervals
//! - Eligibility gating with a configurable minimum history (default 6)
//! - Best-effort audit logging that never fails the forecast path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use delay_forecast::config::EngineConfig;
//! use delay_forecast::data::Dataset;
//! use delay_forecast::engine::ForecastEngine;
//!
//! # fn main() -> delay_forecast::error::Result<()> {
//! let config = EngineConfig::default();
//! let dataset = Dataset::from_csv_path("data/airport_month_clean.csv", &config.target)?;
//! let engine = ForecastEngine::new(dataset, config);
//!
//! // Headline forecast: final step of a 2-month horizon
//! let report = engine.forecast("ABERDEEN", 2)?;
//! println!(
//!     "{} {}: {:.2} min [{:.2}, {:.2}] ({})",
//!     report.airport,
//!     report.forecast_month,
//!     report.predicted_avg_delay,
//!     report.lower_95,
//!     report.upper_95,
//!     report.model_used,
//! );
//!
//! // Per-step means and bounds plus recent actuals, for plotting
//! let plot = engine.plot_series("ABERDEEN", 2)?;
//! assert_eq!(plot.steps.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod catalog;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod selection;

// Re-export commonly used types
pub use crate::catalog::ArimaOrder;
pub use crate::config::EngineConfig;
pub use crate::data::{Dataset, DelayRecord, DelaySeries};
pub use crate::engine::{ForecastEngine, ForecastReport, PlotSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::models::ForecastResult;
pub use crate::selection::SelectionOutcome;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
