//! Engine configuration
//!
//! Defaults match the production dashboard rules: 24-hour baseline window,
//! alert on gaps more than 20% above the historical average, and the
//! 50/20 divergence bands.

use std::env;

use tracing::{info, warn};

use crate::models::gap::{DEFAULT_HEALTHY_GAP_THRESHOLD, DEFAULT_HIGH_GAP_THRESHOLD};
use crate::services::gap_scorer::GapScorerError;

/// Default trailing window for the per-ticker baseline (hours)
pub const DEFAULT_BASELINE_WINDOW_HOURS: i64 = 24;

/// Default alert ratio: alert when gap > baseline * 1.20
pub const DEFAULT_ALERT_RATIO: f64 = 1.20;

/// Default capacity of the record broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Tunable parameters for the gap scorer
#[derive(Debug, Clone)]
pub struct PulseConfig {
    pub baseline_window_hours: i64,
    pub alert_ratio: f64,
    pub high_gap_threshold: f64,
    pub healthy_gap_threshold: f64,
    pub channel_capacity: usize,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            baseline_window_hours: DEFAULT_BASELINE_WINDOW_HOURS,
            alert_ratio: DEFAULT_ALERT_RATIO,
            high_gap_threshold: DEFAULT_HIGH_GAP_THRESHOLD,
            healthy_gap_threshold: DEFAULT_HEALTHY_GAP_THRESHOLD,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PulseConfig {
    /// Build a config from environment variables, falling back to defaults
    ///
    /// Recognized variables: `PULSE_BASELINE_WINDOW_HOURS`,
    /// `PULSE_ALERT_RATIO`, `PULSE_HIGH_GAP_THRESHOLD`,
    /// `PULSE_HEALTHY_GAP_THRESHOLD`. Unparsable values fall back to the
    /// default with a warning; values that make the scorer meaningless
    /// (non-positive window, ratio <= 1.0) are rejected.
    pub fn from_env() -> Result<Self, GapScorerError> {
        dotenvy::dotenv().ok();

        let config = Self {
            baseline_window_hours: env_or(
                "PULSE_BASELINE_WINDOW_HOURS",
                DEFAULT_BASELINE_WINDOW_HOURS,
            ),
            alert_ratio: env_or("PULSE_ALERT_RATIO", DEFAULT_ALERT_RATIO),
            high_gap_threshold: env_or("PULSE_HIGH_GAP_THRESHOLD", DEFAULT_HIGH_GAP_THRESHOLD),
            healthy_gap_threshold: env_or(
                "PULSE_HEALTHY_GAP_THRESHOLD",
                DEFAULT_HEALTHY_GAP_THRESHOLD,
            ),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        };

        config.validate()?;

        info!(
            window_hours = config.baseline_window_hours,
            alert_ratio = config.alert_ratio,
            "Loaded pulse engine config"
        );

        Ok(config)
    }

    /// Reject configurations the scorer cannot operate under
    pub fn validate(&self) -> Result<(), GapScorerError> {
        if self.baseline_window_hours <= 0 {
            return Err(GapScorerError::InvalidConfig(format!(
                "baseline window must be positive, got {} hours",
                self.baseline_window_hours
            )));
        }

        if self.alert_ratio <= 1.0 || !self.alert_ratio.is_finite() {
            return Err(GapScorerError::InvalidConfig(format!(
                "alert ratio must be a finite value above 1.0, got {}",
                self.alert_ratio
            )));
        }

        if self.healthy_gap_threshold > self.high_gap_threshold {
            return Err(GapScorerError::InvalidConfig(format!(
                "healthy threshold {} exceeds high threshold {}",
                self.healthy_gap_threshold, self.high_gap_threshold
            )));
        }

        Ok(())
    }
}

/// Read and parse an env var, warning and falling back on bad input
fn env_or<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    var = key,
                    raw = %raw,
                    default = %default,
                    "Unparsable env value, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}
