//! Best-of-3 candidate selection via last-point holdout validation
//!
//! The last observation is withheld, each catalog candidate is fitted on the
//! rest and asked for a one-step forecast, and the candidate with the
//! smallest absolute error against the withheld actual wins. Ties keep the
//! earliest candidate in catalog order. Selection is re-run from scratch on
//! every forecast call; candidate fits are cheap relative to the freshness
//! requirement of the series, and caching would invite stale-model bugs when
//! the dataset is swapped.

use tracing::debug;

use crate::catalog::{ArimaOrder, CANDIDATES};
use crate::config::CONFIDENCE_LEVEL;
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, TrainedForecastModel};

/// Per-candidate validation outcome, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct CandidateOutcome {
    /// Stable catalog name of the candidate
    pub name: String,
    /// Absolute one-step error, or the reason the candidate was skipped
    pub outcome: std::result::Result<f64, String>,
}

/// Winner of candidate selection plus the full per-candidate record.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Stable name of the chosen candidate
    pub model: String,
    /// Absolute one-step holdout error of the winner
    pub validation_error: f64,
    /// Outcome of every candidate, in catalog order
    pub candidates: Vec<CandidateOutcome>,
}

/// Select the best ARIMA candidate for `values` by last-point validation.
pub fn select_model(
    values: &[f64],
    min_history: usize,
    max_iterations: usize,
) -> Result<SelectionOutcome> {
    select_model_with(values, min_history, |order, name, train| {
        let fitted = ArimaModel::new(*order, name).fit(train, max_iterations)?;
        let forecast = fitted.forecast(1, CONFIDENCE_LEVEL)?;
        Ok(forecast.values()[0])
    })
}

/// Selection loop, generic over the one-step forecasting function.
///
/// `one_step` receives (order, name, training slice) and returns the one-step
/// prediction; any error it reports skips that candidate without aborting the
/// others. Exposed so tests can inject counting or failing doubles.
pub fn select_model_with<F>(
    values: &[f64],
    min_history: usize,
    mut one_step: F,
) -> Result<SelectionOutcome>
where
    F: FnMut(&ArimaOrder, &str, &[f64]) -> Result<f64>,
{
    if values.len() < min_history {
        return Err(ForecastError::InsufficientHistory {
            len: values.len(),
            min: min_history,
        });
    }

    let (train, holdout) = values.split_at(values.len() - 1);
    let actual = holdout[0];

    let mut candidates = Vec::with_capacity(CANDIDATES.len());
    let mut best: Option<(&str, f64)> = None;

    for &(order, name) in CANDIDATES {
        let outcome = match one_step(&order, name, train) {
            Ok(prediction) => {
                let error = (actual - prediction).abs();
                if error.is_finite() {
                    // Strict improvement only: ties keep the earlier candidate
                    if best.map_or(true, |(_, e)| error < e) {
                        best = Some((name, error));
                    }
                    Ok(error)
                } else {
                    // A NaN error is a failure, never a zero-error win
                    Err("non-finite validation error".to_string())
                }
            }
            Err(e) => Err(e.to_string()),
        };

        debug!(candidate = name, outcome = ?outcome, "Candidate validated");
        candidates.push(CandidateOutcome {
            name: name.to_string(),
            outcome,
        });
    }

    match best {
        Some((model, validation_error)) => Ok(SelectionOutcome {
            model: model.to_string(),
            validation_error,
            candidates,
        }),
        None => {
            let reasons: Vec<String> = candidates
                .iter()
                .map(|c| {
                    format!(
                        "{} ({})",
                        c.name,
                        c.outcome.as_ref().err().map(String::as_str).unwrap_or("?")
                    )
                })
                .collect();
            Err(ForecastError::AllCandidatesFailed(reasons.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SERIES: [f64; 7] = [10.0, 12.0, 9.0, 11.0, 15.0, 14.0, 13.0];

    #[test]
    fn short_series_rejected_before_any_fit() {
        let mut fit_calls = 0;
        let err = select_model_with(&SERIES[..5], 6, |_, _, _| {
            fit_calls += 1;
            Ok(0.0)
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ForecastError::InsufficientHistory { len: 5, min: 6 }
        ));
        assert_eq!(fit_calls, 0);
    }

    #[test]
    fn boundary_length_equal_to_minimum_passes() {
        let outcome = select_model_with(&SERIES[..6], 6, |_, _, _| Ok(14.0)).unwrap();
        assert_eq!(outcome.model, "arima_011");
    }

    #[test]
    fn trains_on_all_but_last_point() {
        let outcome = select_model_with(&SERIES, 6, |_, _, train| {
            assert_eq!(train, &SERIES[..6]);
            Ok(13.5)
        })
        .unwrap();
        assert_approx(outcome.validation_error, 0.5);
    }

    #[test]
    fn picks_smallest_absolute_error() {
        let predictions = [20.0, 12.5, 16.0]; // errors 7.0, 0.5, 3.0
        let mut i = 0;
        let outcome = select_model_with(&SERIES, 6, |_, _, _| {
            let p = predictions[i];
            i += 1;
            Ok(p)
        })
        .unwrap();

        assert_eq!(outcome.model, "arima_110");
        assert_approx(outcome.validation_error, 0.5);
    }

    #[test]
    fn tie_keeps_catalog_earlier_candidate() {
        let outcome = select_model_with(&SERIES, 6, |_, _, _| Ok(12.0)).unwrap();
        assert_eq!(outcome.model, "arima_011");
        assert_approx(outcome.validation_error, 1.0);
    }

    #[test]
    fn failing_candidate_is_skipped_not_fatal() {
        let outcome = select_model_with(&SERIES, 6, |_, name, _| {
            if name == "arima_011" {
                Err(ForecastError::Fit("did not converge".to_string()))
            } else {
                Ok(13.2)
            }
        })
        .unwrap();

        assert_eq!(outcome.model, "arima_110");
        assert!(outcome.candidates[0].outcome.is_err());
        assert!(outcome.candidates[1].outcome.is_ok());
    }

    #[test]
    fn nan_prediction_counts_as_failure_not_win() {
        let outcome = select_model_with(&SERIES, 6, |_, name, _| {
            if name == "arima_011" {
                Ok(f64::NAN)
            } else {
                Ok(10.0)
            }
        })
        .unwrap();

        assert_eq!(outcome.model, "arima_110");
        assert!(outcome.candidates[0].outcome.is_err());
    }

    #[test]
    fn all_candidates_failing_is_terminal() {
        let err = select_model_with(&SERIES, 6, |_, _, _| {
            Err(ForecastError::Fit("did not converge".to_string()))
        })
        .unwrap_err();

        assert!(matches!(err, ForecastError::AllCandidatesFailed(_)));
    }

    #[test]
    fn real_selection_returns_valid_catalog_name() {
        let outcome = select_model(&SERIES, 6, 200).unwrap();
        assert!(crate::catalog::resolve_order(&outcome.model).is_ok());
        assert!(outcome.validation_error.is_finite());
        assert!(outcome.validation_error >= 0.0);
        assert_eq!(outcome.candidates.len(), 3);
    }

    #[test]
    fn real_selection_is_idempotent() {
        let a = select_model(&SERIES, 6, 200).unwrap();
        let b = select_model(&SERIES, 6, 200).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.validation_error, b.validation_error);
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }
}
