//! Elevator availability (alpha) curves.
//!
//! Two closed forms describe how much of the elevator's nominal capacity
//! is usable in a given year. They are not reconcilable into one formula,
//! so both sit behind [`EfficiencyModel`] and are chosen through
//! [`EfficiencyKind`].

use serde::{Deserialize, Serialize};

use crate::{invalid, LogisticsError};

pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EfficiencyKind {
    /// Debris impacts compound yearly while repairs get faster.
    DebrisGrowth {
        incident_rate: f64,
        repair_days: f64,
        debris_growth: f64,
        repair_improvement: f64,
        maintenance_fraction: f64,
    },
    /// Near-linear wear until `knee_offset` years, exponential decay after.
    KneeDecay {
        initial: f64,
        linear_slope: f64,
        knee_offset: f64,
        decay_rate: f64,
    },
}

impl Default for EfficiencyKind {
    fn default() -> Self {
        Self::DebrisGrowth {
            incident_rate: 0.833,
            repair_days: 14.0,
            debris_growth: 0.015,
            repair_improvement: 0.005,
            maintenance_fraction: 0.05,
        }
    }
}

impl EfficiencyKind {
    pub fn knee_decay() -> Self {
        Self::KneeDecay {
            initial: 0.9,
            linear_slope: 0.002,
            knee_offset: 50.0,
            decay_rate: 0.02,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EfficiencyKind::DebrisGrowth { .. } => "debris_growth",
            EfficiencyKind::KneeDecay { .. } => "knee_decay",
        }
    }

    pub fn validate(&self) -> Result<(), LogisticsError> {
        match self {
            EfficiencyKind::DebrisGrowth {
                incident_rate,
                repair_days,
                debris_growth,
                repair_improvement,
                maintenance_fraction,
            } => {
                if !(incident_rate.is_finite() && *incident_rate >= 0.0) {
                    return Err(invalid("incident_rate must be finite and >= 0"));
                }
                if !(repair_days.is_finite() && *repair_days >= 0.0) {
                    return Err(invalid("repair_days must be finite and >= 0"));
                }
                if !(debris_growth.is_finite() && *debris_growth > -1.0) {
                    return Err(invalid("debris_growth must be finite and > -1"));
                }
                if !(repair_improvement.is_finite() && *repair_improvement < 1.0) {
                    return Err(invalid("repair_improvement must be finite and < 1"));
                }
                if !(0.0..=1.0).contains(maintenance_fraction) {
                    return Err(invalid("maintenance_fraction must be in [0, 1]"));
                }
            }
            EfficiencyKind::KneeDecay {
                initial,
                linear_slope,
                knee_offset,
                decay_rate,
            } => {
                if !(0.0..=1.0).contains(initial) {
                    return Err(invalid("initial efficiency must be in [0, 1]"));
                }
                if !(linear_slope.is_finite() && knee_offset.is_finite() && decay_rate.is_finite())
                {
                    return Err(invalid("knee decay parameters must be finite"));
                }
            }
        }
        Ok(())
    }
}

/// Fraction of nominal elevator capacity available `offset` years after
/// the program start. Implementations return values in `[0, 1]`.
pub trait EfficiencyModel: Send + Sync {
    fn alpha(&self, offset: f64) -> f64;
}

#[derive(Clone, Debug)]
pub struct DebrisGrowthEfficiency {
    incident_rate: f64,
    repair_days: f64,
    debris_growth: f64,
    repair_improvement: f64,
    maintenance_fraction: f64,
}

impl DebrisGrowthEfficiency {
    pub fn new(
        incident_rate: f64,
        repair_days: f64,
        debris_growth: f64,
        repair_improvement: f64,
        maintenance_fraction: f64,
    ) -> Self {
        Self {
            incident_rate,
            repair_days,
            debris_growth,
            repair_improvement,
            maintenance_fraction,
        }
    }

    /// Expected debris incidents per year.
    pub fn incidents(&self, offset: f64) -> f64 {
        self.incident_rate * (1.0 + self.debris_growth).powf(offset)
    }

    /// Days needed to repair a single incident.
    pub fn repair_time(&self, offset: f64) -> f64 {
        self.repair_days * (1.0 - self.repair_improvement).powf(offset)
    }

    pub fn downtime_days(&self, offset: f64) -> f64 {
        self.incidents(offset) * self.repair_time(offset)
            + self.maintenance_fraction * DAYS_PER_YEAR
    }
}

impl EfficiencyModel for DebrisGrowthEfficiency {
    fn alpha(&self, offset: f64) -> f64 {
        availability_from_downtime(self.downtime_days(offset))
    }
}

#[derive(Clone, Debug)]
pub struct KneeDecayEfficiency {
    initial: f64,
    linear_slope: f64,
    knee_offset: f64,
    decay_rate: f64,
}

impl KneeDecayEfficiency {
    pub fn new(initial: f64, linear_slope: f64, knee_offset: f64, decay_rate: f64) -> Self {
        Self {
            initial,
            linear_slope,
            knee_offset,
            decay_rate,
        }
    }
}

impl EfficiencyModel for KneeDecayEfficiency {
    fn alpha(&self, offset: f64) -> f64 {
        let raw = if offset < self.knee_offset {
            self.initial - self.linear_slope * offset
        } else {
            // Continuous at the knee.
            let knee_level = self.initial - self.linear_slope * self.knee_offset;
            knee_level * (-self.decay_rate * (offset - self.knee_offset)).exp()
        };
        raw.clamp(0.0, 1.0)
    }
}

/// Converts yearly downtime into an availability fraction in `[0, 1]`.
pub fn availability_from_downtime(downtime_days: f64) -> f64 {
    (1.0 - downtime_days / DAYS_PER_YEAR).clamp(0.0, 1.0)
}

pub fn build_efficiency(kind: &EfficiencyKind) -> Box<dyn EfficiencyModel> {
    match kind {
        EfficiencyKind::DebrisGrowth {
            incident_rate,
            repair_days,
            debris_growth,
            repair_improvement,
            maintenance_fraction,
        } => Box::new(DebrisGrowthEfficiency::new(
            *incident_rate,
            *repair_days,
            *debris_growth,
            *repair_improvement,
            *maintenance_fraction,
        )),
        EfficiencyKind::KneeDecay {
            initial,
            linear_slope,
            knee_offset,
            decay_rate,
        } => Box::new(KneeDecayEfficiency::new(
            *initial,
            *linear_slope,
            *knee_offset,
            *decay_rate,
        )),
    }
}
