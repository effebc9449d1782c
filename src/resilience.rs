//! Lunar inventory after a permanent elevator failure.
//!
//! Supply inflow is the sum of the elevator (lost at `t_fail`), ISRU, the
//! rocket baseline and one delayed step per reinforcement launch site.
//! Inventory integrates `inflow - consumption` with a fixed forward step.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::random::RandomSource;
use crate::{invalid, LogisticsError};

/// Upper bound on integration samples per run.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Flow rates are in t/day, stocks in t, times in days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgeConfig {
    pub consumption_rate: f64,
    pub isru_inflow: f64,
    pub elevator_inflow: f64,
    pub rocket_base_inflow: f64,
    /// Extra inflow from each reinforcement site once active
    pub surge_per_site: f64,
    /// Days after the failure at which each site comes online
    pub activation_delays: Vec<f64>,
    pub initial_stock: f64,
    pub critical_stock: f64,
    pub time_step: f64,
}

impl Default for SurgeConfig {
    fn default() -> Self {
        Self {
            consumption_rate: 3_500.0,
            isru_inflow: 500.0,
            elevator_inflow: 2_000.0,
            rocket_base_inflow: 1_200.0,
            surge_per_site: 180.0,
            activation_delays: spread_delays(5.0, 45.0, 25),
            initial_stock: 100_000.0,
            critical_stock: 30_000.0,
            time_step: 0.18,
        }
    }
}

impl SurgeConfig {
    pub fn validate(&self) -> Result<(), LogisticsError> {
        for (name, value) in [
            ("consumption_rate", self.consumption_rate),
            ("isru_inflow", self.isru_inflow),
            ("elevator_inflow", self.elevator_inflow),
            ("rocket_base_inflow", self.rocket_base_inflow),
            ("surge_per_site", self.surge_per_site),
            ("initial_stock", self.initial_stock),
            ("critical_stock", self.critical_stock),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} must be finite and >= 0")));
            }
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(invalid("time_step must be finite and > 0"));
        }
        if self
            .activation_delays
            .iter()
            .any(|delay| !(delay.is_finite() && *delay >= 0.0))
        {
            return Err(invalid("activation_delays must be finite and >= 0"));
        }
        Ok(())
    }

    /// Total supply inflow at day `t` for a failure at `t_fail`.
    pub fn inflow(&self, t: f64, t_fail: f64) -> f64 {
        let elevator = if t < t_fail { self.elevator_inflow } else { 0.0 };
        let surge: f64 = self
            .activation_delays
            .iter()
            .filter(|&&delay| t >= t_fail + delay)
            .map(|_| self.surge_per_site)
            .sum();
        elevator + self.isru_inflow + self.rocket_base_inflow + surge
    }

    pub fn net_flow(&self, t: f64, t_fail: f64) -> f64 {
        self.inflow(t, t_fail) - self.consumption_rate
    }
}

/// `count` delays spread evenly over `[min, max]`.
pub fn spread_delays(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count).map(|idx| min + step * idx as f64).collect()
        }
    }
}

/// `count` delays drawn uniformly from `[min, max)`, sorted ascending.
pub fn sampled_delays<R: RandomSource + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
    count: usize,
) -> Vec<f64> {
    let mut delays: Vec<f64> = (0..count)
        .map(|_| min + (max - min) * rng.uniform())
        .collect();
    delays.sort_by(f64::total_cmp);
    delays
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventorySample {
    pub t: f64,
    pub inflow: f64,
    pub net_flow: f64,
    pub stock: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryTrajectory {
    pub samples: Vec<InventorySample>,
    pub critical_stock: f64,
}

impl InventoryTrajectory {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn min_stock(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.stock).reduce(f64::min)
    }

    pub fn final_stock(&self) -> Option<f64> {
        self.samples.last().map(|s| s.stock)
    }

    pub fn depleted_below(&self, threshold: f64) -> bool {
        self.samples.iter().any(|s| s.stock < threshold)
    }

    pub fn breaches_critical(&self) -> bool {
        self.depleted_below(self.critical_stock)
    }

    pub fn first_breach_day(&self) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.stock < self.critical_stock)
            .map(|s| s.t)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub failure_day: f64,
    pub trajectory: InventoryTrajectory,
    /// Days after the failure until net flow turns non-negative
    pub pivot_day: Option<f64>,
    /// Sample index of the pivot
    pub pivot_index: Option<usize>,
}

impl RecoveryOutcome {
    pub fn breaches_critical(&self) -> bool {
        self.trajectory.breaches_critical()
    }
}

pub fn simulate_failure_recovery(
    t_fail: f64,
    horizon_days: f64,
    config: &SurgeConfig,
) -> Result<RecoveryOutcome, LogisticsError> {
    config.validate()?;
    if !(t_fail.is_finite() && t_fail >= 0.0) {
        return Err(invalid("t_fail must be finite and >= 0"));
    }
    if !(horizon_days.is_finite() && horizon_days > 0.0) {
        return Err(invalid("horizon_days must be finite and > 0"));
    }

    let dt = config.time_step;
    let steps = (horizon_days / dt).floor();
    if steps >= MAX_SAMPLES as f64 {
        return Err(invalid(format!(
            "horizon_days / time_step must stay below {MAX_SAMPLES} samples"
        )));
    }
    let n_samples = (steps as usize)
        .checked_add(1)
        .ok_or_else(|| invalid("sample count overflows"))?;
    let mut samples = Vec::with_capacity(n_samples);
    let mut stock = config.initial_stock;
    let mut pivot_index = None;

    for idx in 0..n_samples {
        let t = idx as f64 * dt;
        let inflow = config.inflow(t, t_fail);
        let net_flow = config.net_flow(t, t_fail);
        if idx > 0 {
            stock += net_flow * dt;
        }
        if pivot_index.is_none() && t >= t_fail && net_flow >= 0.0 {
            pivot_index = Some(idx);
        }
        samples.push(InventorySample {
            t,
            inflow,
            net_flow,
            stock,
        });
    }

    let trajectory = InventoryTrajectory {
        samples,
        critical_stock: config.critical_stock,
    };
    let pivot_day = pivot_index.map(|idx| trajectory.samples[idx].t - t_fail);

    debug!(t_fail, horizon_days, ?pivot_day, "surge recovery simulated");
    if let Some(day) = trajectory.first_breach_day() {
        warn!(
            breach_day = day,
            critical_stock = config.critical_stock,
            "inventory fell below critical stock"
        );
    }

    Ok(RecoveryOutcome {
        failure_day: t_fail,
        trajectory,
        pivot_day,
        pivot_index,
    })
}
