//! Deterministic minimum-cost allocation for a fixed project duration.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Configuration;
use crate::efficiency::build_efficiency;
use crate::state::{CumulativeState, PeriodInputs, PeriodState, Pricing};
use crate::{invalid, LogisticsError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub duration: usize,
    /// Operating cost plus infrastructure, before tax
    pub financial_cost: f64,
    pub emissions: f64,
    pub tax: f64,
    pub tax_inclusive_cost: f64,
    /// Rocket cargo as a fraction of total mass
    pub rocket_share: f64,
    pub totals: CumulativeState,
    pub trajectory: Vec<PeriodState>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }
}

/// Splits `total_mass / duration` per year between elevator and rockets.
pub fn simulate(
    duration: usize,
    config: &Configuration,
) -> Result<SimulationResult, LogisticsError> {
    config.validate()?;
    if duration == 0 {
        return Err(invalid("duration must be greater than zero"));
    }

    let efficiency = build_efficiency(&config.efficiency);
    let pricing = Pricing::from_config(config);
    let base_demand = config.total_mass / duration as f64;

    let mut totals = CumulativeState::new();
    let mut trajectory = Vec::with_capacity(duration);

    for period in 0..duration {
        let year = config.year_of(period);
        let alpha = efficiency.alpha(period as f64);
        let inputs = PeriodInputs {
            period,
            year,
            alpha,
            elevator_capacity: config.nominal_elevator_capacity(period) * alpha,
            rocket_capacity: config.cadence.capacity(
                year,
                config.site_count,
                config.payload_per_launch,
            ),
            demand: base_demand * config.earth_demand_fraction(period),
        };
        trajectory.push(totals.advance(inputs, &pricing));
    }

    let financial_cost = totals.financial_cost + config.infrastructure_cost;
    let assessment = pricing.emissions.assess(totals.rocket_cargo);
    let rocket_share = if config.total_mass > 0.0 {
        totals.rocket_cargo / config.total_mass
    } else {
        0.0
    };

    debug!(
        duration,
        efficiency = config.efficiency.label(),
        financial_cost,
        rocket_share,
        launches = totals.launches,
        "allocation run complete"
    );

    Ok(SimulationResult {
        duration,
        financial_cost,
        emissions: assessment.emissions,
        tax: assessment.tax,
        tax_inclusive_cost: financial_cost + assessment.tax,
        rocket_share,
        totals,
        trajectory,
    })
}

/// Runs independent durations concurrently; output keeps input order.
pub fn sweep_durations(
    config: &Configuration,
    durations: &[usize],
) -> Result<Vec<SimulationResult>, LogisticsError> {
    config.validate()?;
    durations
        .par_iter()
        .map(|&duration| simulate(duration, config))
        .collect()
}

/// Lowest tax-inclusive cost; ties go to the shorter duration.
pub fn cheapest_duration(results: &[SimulationResult]) -> Option<&SimulationResult> {
    results.iter().min_by(|a, b| {
        a.tax_inclusive_cost
            .total_cmp(&b.tax_inclusive_cost)
            .then(a.duration.cmp(&b.duration))
    })
}
