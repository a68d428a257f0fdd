//! Market snapshot views
//!
//! Pure helpers the reporting layer uses to turn a stream of scored
//! records into a "current state of the market" view: one latest record
//! per ticker, optionally excluding simulation rows, plus the filters the
//! dashboard applies before charting.

use std::collections::HashMap;

use tracing::debug;

use crate::models::gap::GapRecord;
use crate::models::observation::SIMULATION_TAG;

/// Whether a scored record came from the simulation/backtesting feed
fn is_simulated(record: &GapRecord) -> bool {
    record
        .top_news
        .as_deref()
        .is_some_and(|news| news.contains(SIMULATION_TAG))
}

/// Latest record per ticker
///
/// Records are assumed to arrive in scoring order; for equal timestamps
/// the later record in the slice wins. When `include_simulated` is false,
/// simulation-tagged rows are dropped before selection, so a ticker whose
/// only data is simulated disappears from the snapshot entirely.
pub fn latest_per_ticker(records: &[GapRecord], include_simulated: bool) -> Vec<GapRecord> {
    let mut latest: HashMap<&str, &GapRecord> = HashMap::new();

    for record in records {
        if !include_simulated && is_simulated(record) {
            continue;
        }

        match latest.get(record.ticker.as_str()) {
            Some(existing) if existing.created_at > record.created_at => {}
            _ => {
                latest.insert(record.ticker.as_str(), record);
            }
        }
    }

    let mut snapshot: Vec<GapRecord> = latest.into_values().cloned().collect();
    snapshot.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    debug!(
        tickers = snapshot.len(),
        include_simulated = include_simulated,
        "Built market snapshot"
    );

    snapshot
}

/// Drop records that cannot be plotted (non-positive P/E)
pub fn plot_ready(records: &[GapRecord]) -> Vec<GapRecord> {
    records
        .iter()
        .filter(|r| r.pe_ratio > 0.0)
        .cloned()
        .collect()
}

/// Number of alerting records in a snapshot
pub fn alert_count(records: &[GapRecord]) -> usize {
    records.iter().filter(|r| r.is_alert).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gap::DivergenceBand;
    use chrono::{TimeZone, Utc};

    fn record(ticker: &str, hour: u32, pe: f64, news: Option<&str>) -> GapRecord {
        GapRecord {
            ticker: ticker.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
            pe_ratio: pe,
            hype_score: 50.0,
            gap_score: (pe - 50.0).abs(),
            baseline_avg: None,
            is_alert: false,
            band: DivergenceBand::ModerateGap,
            top_news: news.map(String::from),
        }
    }

    #[test]
    fn test_latest_per_ticker_keeps_newest() {
        let records = vec![
            record("NVDA", 9, 60.0, None),
            record("TSLA", 10, 70.0, None),
            record("NVDA", 11, 65.0, None),
        ];

        let snapshot = latest_per_ticker(&records, true);
        assert_eq!(snapshot.len(), 2);

        let nvda = snapshot.iter().find(|r| r.ticker == "NVDA").unwrap();
        assert_eq!(nvda.pe_ratio, 65.0);
    }

    #[test]
    fn test_equal_timestamps_later_row_wins() {
        let records = vec![
            record("NVDA", 9, 60.0, None),
            record("NVDA", 9, 61.0, None),
        ];

        let snapshot = latest_per_ticker(&records, true);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].pe_ratio, 61.0);
    }

    #[test]
    fn test_simulation_filter() {
        let records = vec![
            record("NVDA", 9, 60.0, Some("[SIMULATION] backfill")),
            record("NVDA", 11, 65.0, Some("Earnings beat")),
            record("TSLA", 10, 70.0, Some("[SIMULATION] backfill")),
        ];

        // Simulation on: TSLA present, NVDA's latest real row wins anyway
        let with_sim = latest_per_ticker(&records, true);
        assert_eq!(with_sim.len(), 2);

        // Simulation off: TSLA has no real rows and disappears
        let live_only = latest_per_ticker(&records, false);
        assert_eq!(live_only.len(), 1);
        assert_eq!(live_only[0].ticker, "NVDA");
        assert_eq!(live_only[0].pe_ratio, 65.0);
    }

    #[test]
    fn test_plot_ready_drops_non_positive_pe() {
        let records = vec![
            record("NVDA", 9, 60.0, None),
            record("LOSS", 9, 0.0, None),
            record("NEG", 9, -12.0, None),
        ];

        let plottable = plot_ready(&records);
        assert_eq!(plottable.len(), 1);
        assert_eq!(plottable[0].ticker, "NVDA");
    }

    #[test]
    fn test_alert_count() {
        let mut alerting = record("NVDA", 9, 60.0, None);
        alerting.is_alert = true;
        let records = vec![alerting, record("TSLA", 10, 70.0, None)];

        assert_eq!(alert_count(&records), 1);
    }
}
