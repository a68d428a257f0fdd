//! Gap Scorer Service
//!
//! Core of the pulse engine: scores each observation's divergence between
//! valuation (P/E) and sentiment (hype), maintains a per-ticker rolling
//! 24-hour baseline, and flags gaps that run more than 20% above the
//! ticker's historical average.
//!
//! Scored records are returned to the caller and broadcast to in-process
//! subscribers for the reporting layer.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::PulseConfig;
use crate::models::gap::{DivergenceBand, GapRecord};
use crate::models::observation::Observation;

/// Error types for the gap scorer
#[derive(Debug)]
pub enum GapScorerError {
    InvalidObservation(String),
    InvalidConfig(String),
}

impl std::fmt::Display for GapScorerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapScorerError::InvalidObservation(msg) => {
                write!(f, "Invalid observation: {}", msg)
            }
            GapScorerError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for GapScorerError {}

/// One scored gap inside a ticker's trailing window
#[derive(Debug, Clone, Copy)]
struct GapPoint {
    at: DateTime<Utc>,
    gap: f64,
}

/// Trailing window of gap scores for a single ticker
///
/// `latest_seen` anchors eviction so a late-arriving older observation
/// cannot widen the window again.
#[derive(Debug, Default)]
struct TickerWindow {
    points: VecDeque<GapPoint>,
    latest_seen: Option<DateTime<Utc>>,
}

impl TickerWindow {
    /// Drop points that have fallen out of the trailing window
    fn evict_older_than(&mut self, cutoff: DateTime<Utc>) {
        self.points.retain(|p| p.at >= cutoff);
    }

    /// Mean gap of the remaining points, None when empty
    fn baseline_avg(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: f64 = self.points.iter().map(|p| p.gap).sum();
        Some(sum / self.points.len() as f64)
    }
}

/// Gap Scorer
///
/// Owns all per-ticker windows; safe to share behind an `Arc` from a
/// concurrent host. Scoring reads no wall clock, so replaying an identical
/// observation sequence from a fresh (or `reset`) scorer reproduces the
/// identical record sequence.
pub struct GapScorer {
    config: PulseConfig,
    /// Trailing windows by ticker (e.g., "NVDA" -> last 24h of gaps)
    windows: RwLock<HashMap<String, TickerWindow>>,
    /// Broadcast channel for scored records
    record_tx: broadcast::Sender<GapRecord>,
}

impl GapScorer {
    /// Create a scorer with a validated config
    pub fn new(config: PulseConfig) -> Result<Self, GapScorerError> {
        config.validate()?;

        info!(
            window_hours = config.baseline_window_hours,
            alert_ratio = config.alert_ratio,
            "GapScorer initialized"
        );

        Ok(Self::build(config))
    }

    fn build(config: PulseConfig) -> Self {
        let (record_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
            record_tx,
        }
    }

    /// Subscribe to scored records
    pub fn subscribe(&self) -> broadcast::Receiver<GapRecord> {
        self.record_tx.subscribe()
    }

    /// Score a single observation
    ///
    /// Computes `gap = |pe_ratio - hype_score|`, evicts window entries
    /// older than the trailing window relative to the latest timestamp
    /// seen for the ticker, and compares the gap against the mean of the
    /// remaining prior gaps. The current observation never contributes to
    /// its own baseline; the first observation for a ticker never alerts.
    pub fn record(&self, observation: &Observation) -> Result<GapRecord, GapScorerError> {
        observation.validate()?;

        let gap_score = (observation.pe_ratio - observation.hype_score).abs();

        let mut windows = self.windows.write();
        let is_new = !windows.contains_key(&observation.ticker);
        let window = windows.entry(observation.ticker.clone()).or_default();

        let latest = match window.latest_seen {
            Some(seen) => seen.max(observation.created_at),
            None => observation.created_at,
        };
        let cutoff = latest - Duration::hours(self.config.baseline_window_hours);
        window.evict_older_than(cutoff);

        let baseline_avg = window.baseline_avg();
        let is_alert = match baseline_avg {
            Some(avg) => gap_score > avg * self.config.alert_ratio,
            None => false,
        };

        window.points.push_back(GapPoint {
            at: observation.created_at,
            gap: gap_score,
        });
        window.latest_seen = Some(latest);
        let tracked = windows.len();
        drop(windows);

        if is_new {
            debug!(ticker = %observation.ticker, total = tracked, "New ticker in scorer");
        }

        let record = GapRecord {
            ticker: observation.ticker.clone(),
            created_at: observation.created_at,
            pe_ratio: observation.pe_ratio,
            hype_score: observation.hype_score,
            gap_score,
            baseline_avg,
            is_alert,
            band: DivergenceBand::classify(
                gap_score,
                self.config.high_gap_threshold,
                self.config.healthy_gap_threshold,
            ),
            top_news: observation.top_news.clone(),
        };

        if is_alert {
            warn!(
                ticker = %record.ticker,
                gap = record.gap_score,
                baseline = ?record.baseline_avg,
                "Gap running above historical average"
            );
        } else {
            debug!(
                ticker = %record.ticker,
                gap = record.gap_score,
                baseline = ?record.baseline_avg,
                "Scored observation"
            );
        }

        // Broadcast (ignore errors if no subscribers)
        let _ = self.record_tx.send(record.clone());

        Ok(record)
    }

    /// Score a batch of observations in order
    ///
    /// Invalid observations are skipped with a warning rather than
    /// aborting the batch. Returns the scored records and the skip count.
    pub fn score_all(&self, observations: &[Observation]) -> (Vec<GapRecord>, usize) {
        let mut records = Vec::with_capacity(observations.len());
        let mut skipped = 0;

        for observation in observations {
            match self.record(observation) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        ticker = %observation.ticker,
                        error = %e,
                        "Skipping observation"
                    );
                }
            }
        }

        if skipped > 0 {
            info!(
                scored = records.len(),
                skipped = skipped,
                "Batch scoring completed with skips"
            );
        }

        (records, skipped)
    }

    /// Clear all ticker windows
    pub fn reset(&self) {
        let mut windows = self.windows.write();
        let cleared = windows.len();
        windows.clear();
        info!(tickers = cleared, "Scorer state reset");
    }

    /// Number of tickers currently tracked
    pub fn ticker_count(&self) -> usize {
        self.windows.read().len()
    }

    /// All tracked tickers
    pub fn tickers(&self) -> Vec<String> {
        self.windows.read().keys().cloned().collect()
    }

    /// Number of in-window points for a ticker (0 if unknown)
    pub fn window_len(&self, ticker: &str) -> usize {
        self.windows
            .read()
            .get(ticker)
            .map_or(0, |w| w.points.len())
    }
}

impl Default for GapScorer {
    fn default() -> Self {
        Self::build(PulseConfig::default())
    }
}
