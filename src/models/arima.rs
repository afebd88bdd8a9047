//! Non-seasonal ARIMA fitting and interval forecasting
//!
//! Fitting minimizes the conditional sum of squares of the ARMA recursion on
//! the differenced series, using a deterministic Nelder-Mead simplex bounded
//! by the configured iteration cap. Stationarity and invertibility are not
//! enforced;
//! monthly delay series are short and often non-stationary, and a fit must
//! not fail merely because a root sits near the unit circle.
//!
//! Forecast intervals come from the fitted model's Gaussian assumptions: the
//! h-step forecast-error variance is the innovation variance times the sum of
//! squared psi weights, cumulated once per order of differencing.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::catalog::ArimaOrder;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

/// ARIMA model configuration with a stable name.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    name: String,
    order: ArimaOrder,
}

/// Fitted ARIMA model, ready to forecast.
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    order: ArimaOrder,
    /// AR coefficients, length p
    phi: Vec<f64>,
    /// MA coefficients, length q
    theta: Vec<f64>,
    /// Innovation variance from the CSS residuals
    sigma2: f64,
    /// The series at each differencing stage: stage 0 is the original levels,
    /// stage d is the fully differenced series the ARMA recursion runs on
    stages: Vec<Vec<f64>>,
    /// Residuals of the fitted recursion on the differenced series
    residuals: Vec<f64>,
}

impl ArimaModel {
    pub fn new(order: ArimaOrder, name: &str) -> Self {
        Self {
            name: name.to_string(),
            order,
        }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }
}

impl ForecastModel for ArimaModel {
    type Trained = FittedArima;

    fn fit(&self, values: &[f64], max_iterations: usize) -> Result<FittedArima> {
        let order = self.order;
        if values.len() < order.min_observations() {
            return Err(ForecastError::Fit(format!(
                "{} needs at least {} observations, got {}",
                order,
                order.min_observations(),
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Fit(format!(
                "{} cannot fit a series containing non-finite values",
                order
            )));
        }

        // Difference d times, keeping every stage for later integration.
        let mut stages = vec![values.to_vec()];
        for _ in 0..order.d {
            let prev = stages.last().unwrap();
            stages.push(difference(prev));
        }
        let w = stages.last().unwrap().clone();

        let n_params = order.p + order.q;
        let params = if n_params == 0 {
            Vec::new()
        } else {
            let objective = |x: &[f64]| css_sum(&w, order.p, order.q, x);
            let (best, best_sse) =
                nelder_mead(objective, &vec![0.0; n_params], 0.5, max_iterations);
            if !best_sse.is_finite() {
                return Err(ForecastError::Fit(format!(
                    "{} optimization diverged to a non-finite objective",
                    order
                )));
            }
            best
        };
        let (phi, theta) = params.split_at(order.p);

        let residuals = css_residuals(&w, order.p, order.q, phi, theta);
        let n_eff = w.len().saturating_sub(order.p);
        if n_eff == 0 {
            return Err(ForecastError::Fit(format!(
                "{} has no effective observations after conditioning",
                order
            )));
        }
        let sigma2 = residuals[order.p..].iter().map(|e| e * e).sum::<f64>() / n_eff as f64;
        if !sigma2.is_finite() {
            return Err(ForecastError::Fit(format!(
                "{} produced a non-finite innovation variance",
                order
            )));
        }

        Ok(FittedArima {
            name: self.name.clone(),
            order,
            phi: phi.to_vec(),
            theta: theta.to_vec(),
            sigma2,
            stages,
            residuals,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for FittedArima {
    fn forecast(&self, horizon: usize, confidence: f64) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::Validation(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        if confidence <= 0.0 || confidence >= 1.0 {
            return Err(ForecastError::Validation(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }

        // Mean path on the differenced series, future innovations at zero.
        let w = self.stages.last().unwrap();
        let mut history = w.clone();
        let mut resid = self.residuals.clone();
        let mut diffed_forecasts = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let mut pred = 0.0;
            for (i, phi) in self.phi.iter().enumerate() {
                if i < history.len() {
                    pred += phi * history[history.len() - 1 - i];
                }
            }
            for (j, theta) in self.theta.iter().enumerate() {
                if j < resid.len() {
                    pred += theta * resid[resid.len() - 1 - j];
                }
            }
            history.push(pred);
            resid.push(0.0);
            diffed_forecasts.push(pred);
        }

        // Undo differencing, innermost stage first.
        let mut mean = diffed_forecasts;
        for stage in self.stages[..self.order.d].iter().rev() {
            let last = *stage.last().unwrap();
            mean = integrate(&mean, last);
        }

        // Gaussian interval from cumulated psi weights.
        let weights = cumulated_psi_weights(&self.phi, &self.theta, self.order.d, horizon);
        let z = normal_quantile(0.5 + confidence / 2.0)?;
        let mut intervals = Vec::with_capacity(horizon);
        let mut var = 0.0;
        for (h, m) in mean.iter().enumerate() {
            var += weights[h] * weights[h] * self.sigma2;
            let margin = z * var.max(0.0).sqrt();
            intervals.push((m - margin, m + margin));
        }

        ForecastResult::new(mean, horizon, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedArima {
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.phi
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.theta
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }
}

/// First-order differencing.
fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Reverse first-order differencing from a known last level.
fn integrate(diffs: &[f64], last_value: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(diffs.len());
    let mut current = last_value;
    for d in diffs {
        current += d;
        out.push(current);
    }
    out
}

/// Residuals of the ARMA(p,q) recursion, conditioning on the first p
/// observations (their residuals are held at zero).
fn css_residuals(w: &[f64], p: usize, q: usize, phi: &[f64], theta: &[f64]) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in p..w.len() {
        let mut pred = 0.0;
        for i in 0..p {
            pred += phi[i] * w[t - 1 - i];
        }
        for j in 0..q {
            if t > j {
                pred += theta[j] * e[t - 1 - j];
            }
        }
        e[t] = w[t] - pred;
    }
    e
}

/// Conditional sum of squares for a packed (phi, theta) parameter vector.
/// Non-finite parameter points evaluate to infinity so the simplex backs off.
fn css_sum(w: &[f64], p: usize, q: usize, params: &[f64]) -> f64 {
    if params.iter().any(|x| !x.is_finite()) {
        return f64::INFINITY;
    }
    let (phi, theta) = params.split_at(p);
    let e = css_residuals(w, p, q, phi, theta);
    let sse: f64 = e[p..].iter().map(|x| x * x).sum();
    if sse.is_finite() {
        sse
    } else {
        f64::INFINITY
    }
}

/// Psi weights of the ARMA part, cumulated `d` times for the integrated
/// process. `weights[h]` multiplies the innovation entering at step h+1.
fn cumulated_psi_weights(phi: &[f64], theta: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    let mut psi = vec![0.0; horizon];
    psi[0] = 1.0;
    for j in 1..horizon {
        let mut w = if j <= theta.len() { theta[j - 1] } else { 0.0 };
        for (i, p) in phi.iter().enumerate() {
            if j > i {
                w += p * psi[j - 1 - i];
            }
        }
        psi[j] = w;
    }
    for _ in 0..d {
        for j in 1..horizon {
            psi[j] += psi[j - 1];
        }
    }
    psi
}

fn normal_quantile(prob: f64) -> Result<f64> {
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::Validation(format!("Normal distribution: {}", e)))?;
    Ok(standard.inverse_cdf(prob))
}

/// Deterministic Nelder-Mead simplex minimization.
///
/// The initial simplex is `x0` plus one vertex per dimension offset by
/// `step`, so repeated fits on identical input walk an identical path.
/// Terminates at `max_iterations` or when the simplex collapses.
fn nelder_mead<F>(f: F, x0: &[f64], step: f64, max_iterations: usize) -> (Vec<f64>, f64)
where
    F: Fn(&[f64]) -> f64,
{
    const ALPHA: f64 = 1.0; // reflection
    const GAMMA: f64 = 2.0; // expansion
    const RHO: f64 = 0.5; // contraction
    const SIGMA: f64 = 0.5; // shrink
    const TOLERANCE: f64 = 1e-10;

    let n = x0.len();
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((x0.to_vec(), f(x0)));
    for i in 0..n {
        let mut x = x0.to_vec();
        x[i] += step;
        let fx = f(&x);
        simplex.push((x, fx));
    }

    for _ in 0..max_iterations {
        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let spread = simplex[n].1 - simplex[0].1;
        if spread.abs() < TOLERANCE {
            break;
        }

        // Centroid of all but the worst vertex
        let mut centroid = vec![0.0; n];
        for (x, _) in &simplex[..n] {
            for (c, xi) in centroid.iter_mut().zip(x) {
                *c += xi / n as f64;
            }
        }

        let worst = simplex[n].clone();
        let reflected: Vec<f64> = centroid
            .iter()
            .zip(&worst.0)
            .map(|(c, w)| c + ALPHA * (c - w))
            .collect();
        let f_reflected = f(&reflected);

        if f_reflected < simplex[0].1 {
            let expanded: Vec<f64> = centroid
                .iter()
                .zip(&reflected)
                .map(|(c, r)| c + GAMMA * (r - c))
                .collect();
            let f_expanded = f(&expanded);
            simplex[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
        } else if f_reflected < simplex[n - 1].1 {
            simplex[n] = (reflected, f_reflected);
        } else {
            let contracted: Vec<f64> = centroid
                .iter()
                .zip(&worst.0)
                .map(|(c, w)| c + RHO * (w - c))
                .collect();
            let f_contracted = f(&contracted);
            if f_contracted < worst.1 {
                simplex[n] = (contracted, f_contracted);
            } else {
                // Shrink toward the best vertex
                let best = simplex[0].0.clone();
                for vertex in simplex.iter_mut().skip(1) {
                    let x: Vec<f64> = best
                        .iter()
                        .zip(&vertex.0)
                        .map(|(b, v)| b + SIGMA * (v - b))
                        .collect();
                    let fx = f(&x);
                    *vertex = (x, fx);
                }
            }
        }
    }

    simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let (best, f_best) = simplex.swap_remove(0);
    (best, f_best)
}
