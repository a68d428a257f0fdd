use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::gap_scorer::GapScorerError;

/// Marker the ingestion pipeline embeds in `top_news` for backfilled or
/// demo rows, so downstream views can exclude them from live data.
pub const SIMULATION_TAG: &str = "SIMULATION";

/// Single ingested data point for a ticker: valuation (P/E) paired with
/// a news sentiment score at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub ticker: String,
    pub created_at: DateTime<Utc>,
    pub pe_ratio: f64,
    pub hype_score: f64,
    /// Most relevant headline attached by the ingestion pipeline, if any.
    pub top_news: Option<String>,
}

impl Observation {
    /// Validates the observation before scoring
    ///
    /// The scorer only accepts complete, finite numeric fields; anything
    /// else must be discarded or re-requested by the caller.
    pub fn validate(&self) -> Result<(), GapScorerError> {
        if self.ticker.trim().is_empty() {
            return Err(GapScorerError::InvalidObservation(
                "ticker cannot be empty".to_string(),
            ));
        }

        if !self.pe_ratio.is_finite() {
            return Err(GapScorerError::InvalidObservation(format!(
                "pe_ratio for '{}' is not finite: {}",
                self.ticker, self.pe_ratio
            )));
        }

        if !self.hype_score.is_finite() {
            return Err(GapScorerError::InvalidObservation(format!(
                "hype_score for '{}' is not finite: {}",
                self.ticker, self.hype_score
            )));
        }

        Ok(())
    }

    /// Whether this row came from the simulation/backtesting feed
    pub fn is_simulated(&self) -> bool {
        self.top_news
            .as_deref()
            .is_some_and(|news| news.contains(SIMULATION_TAG))
    }
}
