//! Lunar logistics - Earth-to-Moon cargo program simulation
//!
//! Moves a fixed cargo mass to the Moon over two channels: a space
//! elevator whose availability degrades with debris, and a rocket fleet
//! whose launch cost follows a learning curve and whose throughput grows
//! with launch-site maturity.
//!
//! Three engines share one per-period state transition
//! ([`CumulativeState::advance`]):
//! - [`allocation`]: deterministic minimum-cost split for a fixed duration
//! - [`monte_carlo`]: randomized completion-time distribution
//! - [`resilience`]: inventory balance after an elevator failure

pub mod allocation;
pub mod capacity;
pub mod config;
pub mod efficiency;
pub mod emissions;
pub mod learning;
pub mod monte_carlo;
pub mod random;
pub mod resilience;
pub mod state;

use thiserror::Error;

pub use allocation::{cheapest_duration, simulate, sweep_durations, SimulationResult};
pub use capacity::LaunchCadence;
pub use config::{Configuration, IsruGrowth};
pub use efficiency::{build_efficiency, EfficiencyKind, EfficiencyModel};
pub use emissions::{EmissionAssessment, EmissionTax};
pub use learning::LearningCurve;
pub use monte_carlo::{
    run_trial, run_trial_outcomes, run_trials, run_trials_seeded, summarize,
    ElevatorPerturbation, RiskConfig, RiskSummary, TrialOutcome,
};
pub use random::RandomSource;
pub use resilience::{
    sampled_delays, simulate_failure_recovery, spread_delays, InventorySample,
    InventoryTrajectory, RecoveryOutcome, SurgeConfig, MAX_SAMPLES,
};
pub use state::{CumulativeState, PeriodInputs, PeriodState, Pricing};

#[derive(Debug, Error)]
pub enum LogisticsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub(crate) fn invalid(message: impl Into<String>) -> LogisticsError {
    LogisticsError::InvalidConfig(message.into())
}
