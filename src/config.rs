//! Engine configuration surface

use serde::{Deserialize, Serialize};

/// Two-sided confidence level used for forecast intervals.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Configuration consumed by the forecast engine.
///
/// Defaults: `avg_delay` target, 6-observation eligibility floor, 1..=3
/// month horizons, 200-iteration optimizer cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name of the target metric column in the cleaned dataset
    #[serde(default = "default_target")]
    pub target: String,

    /// Minimum number of observations required before fitting
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Largest horizon (months ahead) a caller may request
    #[serde(default = "default_max_horizon")]
    pub max_horizon: usize,

    /// Iteration cap for the fitting optimizer
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            min_history: default_min_history(),
            max_horizon: default_max_horizon(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_target() -> String {
    "avg_delay".to_string()
}
fn default_min_history() -> usize {
    6
}
fn default_max_horizon() -> usize {
    3
}
fn default_max_iterations() -> usize {
    200
}
