use chrono::{DateTime, TimeZone, Utc};
use pulse_engine::Observation;

/// Initialize tracing output for tests (safe to call repeatedly)
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pulse_engine=debug")
        .with_test_writer()
        .try_init();
}

/// Timestamp on the shared test day
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
}

/// Observation builder with a plain headline
pub fn observation(ticker: &str, hour: u32, pe_ratio: f64, hype_score: f64) -> Observation {
    Observation {
        ticker: ticker.to_string(),
        created_at: at(hour, 0),
        pe_ratio,
        hype_score,
        top_news: Some(format!("{} in the news", ticker)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_builder_is_valid() {
        let obs = observation("NVDA", 9, 65.0, 88.0);
        assert!(obs.validate().is_ok(), "Builder should produce valid observations");
    }
}
