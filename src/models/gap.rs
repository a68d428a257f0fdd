use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gap above which a ticker is considered speculatively priced
pub const DEFAULT_HIGH_GAP_THRESHOLD: f64 = 50.0;

/// Gap below which pricing is considered in sync with sentiment
pub const DEFAULT_HEALTHY_GAP_THRESHOLD: f64 = 20.0;

/// Coarse classification of a gap score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceBand {
    /// Gap above the high threshold: speculative risk
    HighDivergence,
    /// Gap between the thresholds
    ModerateGap,
    /// Gap below the healthy threshold: efficient pricing
    HealthySync,
}

impl DivergenceBand {
    /// Classify a gap score against band thresholds
    ///
    /// Both boundaries are exclusive: a gap sitting exactly on a threshold
    /// classifies as `ModerateGap`.
    pub fn classify(gap_score: f64, high_threshold: f64, healthy_threshold: f64) -> Self {
        if gap_score > high_threshold {
            DivergenceBand::HighDivergence
        } else if gap_score < healthy_threshold {
            DivergenceBand::HealthySync
        } else {
            DivergenceBand::ModerateGap
        }
    }
}

/// Derived row produced for every scored observation
///
/// Carries the source fields alongside the computed gap so reporting
/// consumers never need to join back to the observation stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapRecord {
    pub ticker: String,
    pub created_at: DateTime<Utc>,
    pub pe_ratio: f64,
    pub hype_score: f64,
    /// |pe_ratio - hype_score|, always >= 0
    pub gap_score: f64,
    /// Trailing-window mean of this ticker's prior gaps; None until at
    /// least one prior in-window observation exists
    pub baseline_avg: Option<f64>,
    /// True when the gap exceeds the baseline by more than the alert ratio
    pub is_alert: bool,
    pub band: DivergenceBand,
    pub top_news: Option<String>,
}
