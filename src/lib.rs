// src/lib.rs

pub mod config;

pub mod models {
    pub mod gap;
    pub mod observation;
}

pub mod services {
    pub mod gap_scorer;
    pub mod snapshot;
}

pub use config::PulseConfig;
pub use models::gap::{DivergenceBand, GapRecord};
pub use models::observation::Observation;
pub use services::gap_scorer::{GapScorer, GapScorerError};
