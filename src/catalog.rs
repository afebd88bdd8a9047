//! Fixed catalog of ARIMA candidate configurations
//!
//! Best-of-3 selection runs over these entries in order. The catalog is
//! process-wide static state and is never mutated at runtime; adding a
//! candidate is a matter of extending the table.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Non-seasonal ARIMA order (p, d, q).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Fewest observations the conditional fit can work with.
    pub fn min_observations(&self) -> usize {
        self.p.max(self.q) + self.d + 1
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Candidate ARIMA orders with their stable names, in selection order.
pub const CANDIDATES: &[(ArimaOrder, &str)] = &[
    (ArimaOrder::new(0, 1, 1), "arima_011"),
    (ArimaOrder::new(1, 1, 0), "arima_110"),
    (ArimaOrder::new(1, 1, 1), "arima_111"),
];

/// Map a stable model name back to its ARIMA order.
pub fn resolve_order(model_name: &str) -> Result<ArimaOrder> {
    CANDIDATES
        .iter()
        .find(|(_, name)| *name == model_name)
        .map(|(order, _)| *order)
        .ok_or_else(|| ForecastError::UnknownModel(model_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_three_candidates_in_order() {
        let names: Vec<&str> = CANDIDATES.iter().map(|(_, n)| *n).collect();
        assert_eq!(names, vec!["arima_011", "arima_110", "arima_111"]);
    }

    #[test]
    fn resolve_known_names() {
        assert_eq!(resolve_order("arima_011").unwrap(), ArimaOrder::new(0, 1, 1));
        assert_eq!(resolve_order("arima_110").unwrap(), ArimaOrder::new(1, 1, 0));
        assert_eq!(resolve_order("arima_111").unwrap(), ArimaOrder::new(1, 1, 1));
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let err = resolve_order("arima_212").unwrap_err();
        assert!(matches!(err, ForecastError::UnknownModel(n) if n == "arima_212"));
    }
}
