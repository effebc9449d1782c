//! Per-period state and the cumulative accumulator shared by every engine.
//!
//! [`CumulativeState::advance`] is the single state transition: elevator
//! first, rocket absorbs the residual, learning-curve pricing uses the
//! launches flown so far.

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::emissions::EmissionTax;
use crate::learning::LearningCurve;

/// Prices applied to one period's cargo split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub elevator_cost_per_mass: f64,
    pub payload_per_launch: f64,
    pub curve: LearningCurve,
    pub emissions: EmissionTax,
}

impl Pricing {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            elevator_cost_per_mass: config.elevator_cost_per_mass,
            payload_per_launch: config.payload_per_launch,
            curve: config.learning_curve(),
            emissions: config.emission_tax(),
        }
    }
}

/// Channel conditions for one period, before any cargo is routed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodInputs {
    pub period: usize,
    pub year: f64,
    pub alpha: f64,
    /// Usable elevator throughput this period [t]
    pub elevator_capacity: f64,
    /// Physical rocket ceiling this period [t]
    pub rocket_capacity: f64,
    /// Cargo to move this period [t]
    pub demand: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodState {
    pub period: usize,
    pub year: f64,
    pub alpha: f64,
    pub elevator_capacity: f64,
    pub rocket_capacity: f64,
    pub demand: f64,
    pub elevator_cargo: f64,
    pub rocket_cargo: f64,
    pub launches: f64,
    pub elevator_cost: f64,
    pub rocket_cost: f64,
    pub emissions: f64,
}

impl PeriodState {
    pub fn delivered(&self) -> f64 {
        self.elevator_cargo + self.rocket_cargo
    }

    pub fn cost(&self) -> f64 {
        self.elevator_cost + self.rocket_cost
    }
}

/// Running totals for one simulation run. Never shared between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeState {
    pub financial_cost: f64,
    pub launches: f64,
    pub elevator_cargo: f64,
    pub rocket_cargo: f64,
    pub emissions: f64,
}

impl CumulativeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> f64 {
        self.elevator_cargo + self.rocket_cargo
    }

    /// Routes `inputs.demand` and folds the period into the totals.
    pub fn advance(&mut self, inputs: PeriodInputs, pricing: &Pricing) -> PeriodState {
        let demand = inputs.demand.max(0.0);
        let elevator_capacity = inputs.elevator_capacity.max(0.0);

        let elevator_cargo = demand.min(elevator_capacity);
        let rocket_cargo = demand - elevator_cargo;
        let launches = rocket_cargo / pricing.payload_per_launch;

        let elevator_cost = elevator_cargo * pricing.elevator_cost_per_mass;
        let rocket_cost = pricing.curve.batch_cost(self.launches, launches);
        let emissions = pricing.emissions.emissions(rocket_cargo);

        self.financial_cost += elevator_cost + rocket_cost;
        self.launches += launches;
        self.elevator_cargo += elevator_cargo;
        self.rocket_cargo += rocket_cargo;
        self.emissions += emissions;

        PeriodState {
            period: inputs.period,
            year: inputs.year,
            alpha: inputs.alpha,
            elevator_capacity,
            rocket_capacity: inputs.rocket_capacity.max(0.0),
            demand,
            elevator_cargo,
            rocket_cargo,
            launches,
            elevator_cost,
            rocket_cost,
            emissions,
        }
    }
}
