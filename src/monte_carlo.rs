//! Completion-time risk under randomized channel performance.
//!
//! Each trial replays the allocation recurrence at maximum effort: every
//! period ships as much as both channels can carry until the cargo is
//! gone or the period ceiling is reached. Trials own their accumulator
//! and random stream, so they run in parallel without shared state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Configuration;
use crate::efficiency::{
    availability_from_downtime, build_efficiency, EfficiencyModel, DAYS_PER_YEAR,
};
use crate::random::RandomSource;
use crate::state::{CumulativeState, PeriodInputs, Pricing};
use crate::{invalid, LogisticsError};

/// How the elevator's availability is randomized each period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ElevatorPerturbation {
    /// Normal noise around the deterministic alpha trend.
    TrendNoise { std_dev: f64 },
    /// Poisson debris strikes, each costing one Normal repair duration.
    DebrisEvents {
        incident_rate: f64,
        incident_growth: f64,
        repair_mean_days: f64,
        repair_std_days: f64,
        maintenance_fraction: f64,
    },
}

impl Default for ElevatorPerturbation {
    fn default() -> Self {
        Self::TrendNoise { std_dev: 0.05 }
    }
}

impl ElevatorPerturbation {
    pub fn debris_events() -> Self {
        Self::DebrisEvents {
            incident_rate: 0.833,
            incident_growth: 0.015,
            repair_mean_days: 14.0,
            repair_std_days: 3.0,
            maintenance_fraction: 0.05,
        }
    }

    fn draw_alpha<R: RandomSource + ?Sized>(&self, trend: f64, offset: f64, rng: &mut R) -> f64 {
        match self {
            ElevatorPerturbation::TrendNoise { std_dev } => {
                rng.normal(trend, *std_dev).clamp(0.0, 1.0)
            }
            ElevatorPerturbation::DebrisEvents {
                incident_rate,
                incident_growth,
                repair_mean_days,
                repair_std_days,
                maintenance_fraction,
            } => {
                let mean_events = incident_rate * (1.0 + incident_growth).powf(offset);
                let events = rng.poisson(mean_events) as f64;
                let repair = rng.normal(*repair_mean_days, *repair_std_days).max(0.0);
                availability_from_downtime(events * repair + maintenance_fraction * DAYS_PER_YEAR)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub perturbation: ElevatorPerturbation,
    /// Mean fraction of rocket capacity lost to weather scrubs
    pub weather_loss_mean: f64,
    pub weather_loss_std: f64,
    /// Hard ceiling on periods per trial
    pub max_periods: usize,
    pub target_periods: usize,
    pub seed: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            perturbation: ElevatorPerturbation::default(),
            weather_loss_mean: 0.16,
            weather_loss_std: 0.05,
            max_periods: 200,
            target_periods: 60,
            seed: 2050,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), LogisticsError> {
        if self.max_periods == 0 {
            return Err(invalid("max_periods must be greater than zero"));
        }
        if !self.weather_loss_mean.is_finite() {
            return Err(invalid("weather_loss_mean must be finite"));
        }
        if !(self.weather_loss_std.is_finite() && self.weather_loss_std >= 0.0) {
            return Err(invalid("weather_loss_std must be finite and >= 0"));
        }
        match &self.perturbation {
            ElevatorPerturbation::TrendNoise { std_dev } => {
                if !(std_dev.is_finite() && *std_dev >= 0.0) {
                    return Err(invalid("trend noise std_dev must be finite and >= 0"));
                }
            }
            ElevatorPerturbation::DebrisEvents {
                incident_rate,
                incident_growth,
                repair_mean_days,
                repair_std_days,
                maintenance_fraction,
            } => {
                if !(incident_rate.is_finite() && *incident_rate >= 0.0) {
                    return Err(invalid("incident_rate must be finite and >= 0"));
                }
                if !(incident_growth.is_finite() && *incident_growth > -1.0) {
                    return Err(invalid("incident_growth must be finite and > -1"));
                }
                if !(repair_mean_days.is_finite()
                    && repair_std_days.is_finite()
                    && *repair_std_days >= 0.0)
                {
                    return Err(invalid("repair duration parameters must be finite"));
                }
                if !(0.0..=1.0).contains(maintenance_fraction) {
                    return Err(invalid("maintenance_fraction must be in [0, 1]"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TrialOutcome {
    Completed {
        periods: usize,
        /// Realized cost including infrastructure
        financial_cost: f64,
    },
    /// Cargo was still outstanding when the period ceiling was hit.
    DidNotConverge { periods: usize, remaining: f64 },
}

impl TrialOutcome {
    pub fn periods(&self) -> usize {
        match self {
            TrialOutcome::Completed { periods, .. } => *periods,
            TrialOutcome::DidNotConverge { periods, .. } => *periods,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TrialOutcome::Completed { .. })
    }

    pub fn completed_within(&self, target: usize) -> bool {
        matches!(self, TrialOutcome::Completed { periods, .. } if *periods <= target)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub site_count: usize,
    pub n_trials: usize,
    pub target_periods: usize,
    pub completed: usize,
    pub did_not_converge: usize,
    /// Non-converged trials count at the ceiling.
    pub mean_periods: f64,
    pub max_periods: usize,
    /// Share of all trials completed within `target_periods`.
    pub p_within_target: f64,
    pub mean_financial_cost: Option<f64>,
}

/// One trial with its own random stream.
pub fn run_trial<R: RandomSource + ?Sized>(
    config: &Configuration,
    risk: &RiskConfig,
    site_count: usize,
    rng: &mut R,
) -> Result<TrialOutcome, LogisticsError> {
    config.validate()?;
    risk.validate()?;
    let efficiency = build_efficiency(&config.efficiency);
    Ok(simulate_trial(
        config,
        risk,
        site_count,
        efficiency.as_ref(),
        rng,
    ))
}

/// Outcomes of `n_trials` independent trials. Child seeds are drawn from
/// `rng` up front, so the result does not depend on thread scheduling.
pub fn run_trial_outcomes<R: RandomSource + ?Sized>(
    config: &Configuration,
    risk: &RiskConfig,
    site_count: usize,
    n_trials: usize,
    rng: &mut R,
) -> Result<Vec<TrialOutcome>, LogisticsError> {
    config.validate()?;
    risk.validate()?;
    if n_trials == 0 {
        return Err(invalid("n_trials must be greater than zero"));
    }

    let efficiency = build_efficiency(&config.efficiency);
    let seeds: Vec<u64> = (0..n_trials).map(|_| rng.fork_seed()).collect();

    Ok(seeds
        .par_iter()
        .map(|&seed| {
            let mut trial_rng = ChaCha8Rng::seed_from_u64(seed);
            simulate_trial(config, risk, site_count, efficiency.as_ref(), &mut trial_rng)
        })
        .collect())
}

pub fn run_trials<R: RandomSource + ?Sized>(
    config: &Configuration,
    risk: &RiskConfig,
    site_count: usize,
    n_trials: usize,
    rng: &mut R,
) -> Result<RiskSummary, LogisticsError> {
    let outcomes = run_trial_outcomes(config, risk, site_count, n_trials, rng)?;
    let summary = summarize(site_count, risk.target_periods, &outcomes);

    info!(
        site_count,
        n_trials,
        mean_periods = summary.mean_periods,
        p_within_target = summary.p_within_target,
        "monte carlo batch complete"
    );
    if summary.did_not_converge > 0 {
        warn!(
            site_count,
            did_not_converge = summary.did_not_converge,
            ceiling = risk.max_periods,
            "trials hit the period ceiling"
        );
    }

    Ok(summary)
}

pub fn run_trials_seeded(
    config: &Configuration,
    risk: &RiskConfig,
    site_count: usize,
    n_trials: usize,
) -> Result<RiskSummary, LogisticsError> {
    let mut rng = StdRng::seed_from_u64(risk.seed);
    run_trials(config, risk, site_count, n_trials, &mut rng)
}

pub fn summarize(
    site_count: usize,
    target_periods: usize,
    outcomes: &[TrialOutcome],
) -> RiskSummary {
    let mut completed = 0;
    let mut period_sum = 0.0;
    let mut max_periods = 0;
    let mut within = 0;
    let mut cost_sum = 0.0;

    for outcome in outcomes {
        period_sum += outcome.periods() as f64;
        max_periods = max_periods.max(outcome.periods());
        if outcome.completed_within(target_periods) {
            within += 1;
        }
        if outcome.is_completed() {
            completed += 1;
        }
        if let TrialOutcome::Completed { financial_cost, .. } = outcome {
            cost_sum += financial_cost;
        }
    }

    let n_trials = outcomes.len();
    let (mean_periods, p_within_target) = if n_trials == 0 {
        (0.0, 0.0)
    } else {
        (
            period_sum / n_trials as f64,
            within as f64 / n_trials as f64,
        )
    };

    RiskSummary {
        site_count,
        n_trials,
        target_periods,
        completed,
        did_not_converge: n_trials - completed,
        mean_periods,
        max_periods,
        p_within_target,
        mean_financial_cost: (completed > 0).then(|| cost_sum / completed as f64),
    }
}

/// `remaining` is the program need still open. With ISRU active only the
/// Earth fraction of it has to be shipped, so each shipped tonne closes
/// `1 / earth_fraction` tonnes of need.
fn simulate_trial<R: RandomSource + ?Sized>(
    config: &Configuration,
    risk: &RiskConfig,
    site_count: usize,
    efficiency: &dyn EfficiencyModel,
    rng: &mut R,
) -> TrialOutcome {
    let pricing = Pricing::from_config(config);
    let mut totals = CumulativeState::new();
    let mut remaining = config.total_mass;

    if remaining <= 0.0 {
        return TrialOutcome::Completed {
            periods: 0,
            financial_cost: config.infrastructure_cost,
        };
    }

    for period in 0..risk.max_periods {
        let year = config.year_of(period);
        let offset = period as f64;

        let alpha = risk
            .perturbation
            .draw_alpha(efficiency.alpha(offset), offset, rng);
        let weather_loss = rng
            .normal(risk.weather_loss_mean, risk.weather_loss_std)
            .max(0.0);

        let elevator_capacity = config.nominal_elevator_capacity(period) * alpha;
        let rocket_capacity = config
            .cadence
            .capacity(year, site_count, config.payload_per_launch)
            * (1.0 - weather_loss).max(0.0);
        let throughput = elevator_capacity + rocket_capacity;
        let earth_fraction = config.earth_demand_fraction(period);
        let earth_need = remaining * earth_fraction;
        let finishing = throughput >= earth_need;

        totals.advance(
            PeriodInputs {
                period,
                year,
                alpha,
                elevator_capacity,
                rocket_capacity,
                demand: earth_need.min(throughput),
            },
            &pricing,
        );

        if finishing {
            return TrialOutcome::Completed {
                periods: period + 1,
                financial_cost: totals.financial_cost + config.infrastructure_cost,
            };
        }
        // earth_fraction > 0 here, otherwise earth_need would be zero.
        remaining -= throughput / earth_fraction;
    }

    TrialOutcome::DidNotConverge {
        periods: risk.max_periods,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{
        run_trial, run_trials, run_trials_seeded, summarize, ElevatorPerturbation, RiskConfig,
        TrialOutcome,
    };
    use crate::config::{Configuration, IsruGrowth};

    #[test]
    fn fixed_seed_is_reproducible() {
        let config = Configuration::default();
        let risk = RiskConfig::default();
        let a = run_trials_seeded(&config, &risk, 25, 64).expect("valid batch");
        let b = run_trials_seeded(&config, &risk, 25, 64).expect("valid batch");
        assert_eq!(a, b);
    }

    #[test]
    fn more_sites_finish_sooner() {
        let config = Configuration::default();
        let risk = RiskConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let baseline = run_trials(&config, &risk, 10, 200, &mut rng).expect("valid batch");
        let expanded = run_trials(&config, &risk, 25, 200, &mut rng).expect("valid batch");

        assert_eq!(expanded.completed, 200);
        assert!(expanded.mean_periods > 54.0 && expanded.mean_periods < 62.0);
        assert!(expanded.p_within_target > 0.9);

        assert!(baseline.mean_periods > 95.0);
        assert_eq!(baseline.p_within_target, 0.0);
        assert!(baseline.mean_periods > expanded.mean_periods);
    }

    #[test]
    fn debris_event_variant_matches_trend_noise_scale() {
        let config = Configuration::default();
        let risk = RiskConfig {
            perturbation: ElevatorPerturbation::debris_events(),
            ..RiskConfig::default()
        };
        let summary = run_trials_seeded(&config, &risk, 25, 100).expect("valid batch");
        assert_eq!(summary.did_not_converge, 0);
        assert!(summary.mean_periods > 54.0 && summary.mean_periods < 62.0);
    }

    #[test]
    fn stalled_program_is_reported_as_non_converged() {
        let config = Configuration {
            elevator_capacity: 0.0,
            ..Configuration::default()
        };
        let risk = RiskConfig {
            max_periods: 150,
            ..RiskConfig::default()
        };
        let summary = run_trials_seeded(&config, &risk, 0, 20).expect("valid batch");
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.did_not_converge, 20);
        assert_eq!(summary.max_periods, 150);
        assert_eq!(summary.mean_periods, 150.0);
        assert_eq!(summary.p_within_target, 0.0);
        assert_eq!(summary.mean_financial_cost, None);
    }

    #[test]
    fn empty_cargo_completes_immediately() {
        let config = Configuration {
            total_mass: 0.0,
            ..Configuration::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome =
            run_trial(&config, &RiskConfig::default(), 10, &mut rng).expect("valid trial");
        assert_eq!(
            outcome,
            TrialOutcome::Completed {
                periods: 0,
                financial_cost: config.infrastructure_cost,
            }
        );
    }

    #[test]
    fn completed_trial_cost_exceeds_infrastructure() {
        let config = Configuration::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = run_trial(&config, &RiskConfig::default(), 25, &mut rng).expect("valid");
        match outcome {
            TrialOutcome::Completed { financial_cost, .. } => {
                assert!(financial_cost > config.infrastructure_cost);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn isru_shortens_trials_on_the_same_stream() {
        let base = Configuration::default();
        let with_isru = Configuration {
            isru: Some(IsruGrowth::default()),
            ..Configuration::default()
        };
        let risk = RiskConfig::default();
        for seed in [1, 7, 42] {
            let mut a = ChaCha8Rng::seed_from_u64(seed);
            let mut b = ChaCha8Rng::seed_from_u64(seed);
            let plain = run_trial(&base, &risk, 25, &mut a).expect("valid trial");
            let reduced = run_trial(&with_isru, &risk, 25, &mut b).expect("valid trial");
            assert!(plain.is_completed() && reduced.is_completed());
            assert!(reduced.periods() <= plain.periods());
        }
    }

    #[test]
    fn saturated_isru_finishes_almost_at_once() {
        let config = Configuration {
            isru: Some(IsruGrowth {
                max_share: 1.0,
                steepness: 10.0,
                midpoint_period: 0.0,
            }),
            ..Configuration::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let outcome = run_trial(&config, &RiskConfig::default(), 10, &mut rng).expect("valid");
        assert!(outcome.is_completed());
        assert!(outcome.periods() <= 2);
    }

    #[test]
    fn zero_trials_is_rejected() {
        let config = Configuration::default();
        assert!(run_trials_seeded(&config, &RiskConfig::default(), 10, 0).is_err());
    }

    #[test]
    fn summary_counts_capped_trials_as_misses() {
        let outcomes = [
            TrialOutcome::Completed {
                periods: 50,
                financial_cost: 1.0,
            },
            TrialOutcome::Completed {
                periods: 70,
                financial_cost: 3.0,
            },
            TrialOutcome::DidNotConverge {
                periods: 200,
                remaining: 10.0,
            },
        ];
        let summary = summarize(25, 60, &outcomes);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.did_not_converge, 1);
        assert_eq!(summary.max_periods, 200);
        assert!((summary.mean_periods - 320.0 / 3.0).abs() < 1e-12);
        assert!((summary.p_within_target - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.mean_financial_cost, Some(2.0));
    }
}
