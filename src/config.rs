use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::capacity::LaunchCadence;
use crate::efficiency::EfficiencyKind;
use crate::emissions::EmissionTax;
use crate::learning::LearningCurve;
use crate::{invalid, LogisticsError};

/// Calibrated program constants. Loaded once and never mutated by a run.
///
/// Omitted fields take the calibrated defaults below. A scalar given as
/// JSON `null` takes its type default instead (`0`, `0.0`), which
/// `validate` rejects where zero is not meaningful.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Total cargo to deliver [t]
    #[serde_as(as = "DefaultOnNull")]
    pub total_mass: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub start_year: i32,
    /// Nominal elevator throughput [t/yr]
    #[serde_as(as = "DefaultOnNull")]
    pub elevator_capacity: f64,
    /// [$/t]
    #[serde_as(as = "DefaultOnNull")]
    pub elevator_cost_per_mass: f64,
    /// Yearly compounding of the elevator's nominal capacity
    #[serde_as(as = "DefaultOnNull")]
    pub elevator_growth_rate: f64,
    /// [t/launch]
    #[serde_as(as = "DefaultOnNull")]
    pub payload_per_launch: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub launch_cost_initial: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub launch_cost_floor: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub learning_rate: f64,
    /// One-off launch-site construction cost [$]
    #[serde_as(as = "DefaultOnNull")]
    pub infrastructure_cost: f64,
    /// [t CO2e / t payload]
    #[serde_as(as = "DefaultOnNull")]
    pub emission_factor: f64,
    /// [$ / t CO2e]
    #[serde_as(as = "DefaultOnNull")]
    pub carbon_tax: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub site_count: usize,
    pub efficiency: EfficiencyKind,
    pub cadence: LaunchCadence,
    pub isru: Option<IsruGrowth>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            total_mass: 100_000_000.0,
            start_year: 2050,
            elevator_capacity: 537_000.0,
            elevator_cost_per_mass: 220_000.0,
            elevator_growth_rate: 0.0,
            payload_per_launch: 150.0,
            launch_cost_initial: 375_000_000.0,
            launch_cost_floor: 10_000_000.0,
            learning_rate: 0.85,
            infrastructure_cost: 75_000_000_000.0,
            emission_factor: 2.5,
            carbon_tax: 150.0,
            site_count: 10,
            efficiency: EfficiencyKind::default(),
            cadence: LaunchCadence::default(),
            isru: None,
        }
    }
}

/// Lunar in-situ resource utilisation: share of demand met locally,
/// growing logistically over the program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsruGrowth {
    pub max_share: f64,
    pub steepness: f64,
    pub midpoint_period: f64,
}

impl Default for IsruGrowth {
    fn default() -> Self {
        Self {
            max_share: 0.5,
            steepness: 0.12,
            midpoint_period: 25.0,
        }
    }
}

impl IsruGrowth {
    pub fn share(&self, period: f64) -> f64 {
        self.max_share / (1.0 + (-self.steepness * (period - self.midpoint_period)).exp())
    }
}

impl Configuration {
    pub fn from_json_str(raw: &str) -> Result<Self, LogisticsError> {
        let config: Configuration = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, LogisticsError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), LogisticsError> {
        if !(self.total_mass.is_finite() && self.total_mass >= 0.0) {
            return Err(invalid("total_mass must be finite and >= 0"));
        }

        if !(self.learning_rate > 0.0 && self.learning_rate < 1.0) {
            return Err(invalid("learning_rate must be in (0, 1)"));
        }

        if !(self.payload_per_launch.is_finite() && self.payload_per_launch > 0.0) {
            return Err(invalid("payload_per_launch must be finite and > 0"));
        }

        for (name, value) in [
            ("elevator_capacity", self.elevator_capacity),
            ("elevator_cost_per_mass", self.elevator_cost_per_mass),
            ("launch_cost_initial", self.launch_cost_initial),
            ("launch_cost_floor", self.launch_cost_floor),
            ("infrastructure_cost", self.infrastructure_cost),
            ("emission_factor", self.emission_factor),
            ("carbon_tax", self.carbon_tax),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} must be finite and >= 0")));
            }
        }

        if !(self.elevator_growth_rate.is_finite() && self.elevator_growth_rate > -1.0) {
            return Err(invalid("elevator_growth_rate must be finite and > -1"));
        }

        if let Some(isru) = &self.isru {
            if !(0.0..=1.0).contains(&isru.max_share) {
                return Err(invalid("isru max_share must be in [0, 1]"));
            }
            if !(isru.steepness.is_finite() && isru.midpoint_period.is_finite()) {
                return Err(invalid("isru steepness and midpoint_period must be finite"));
            }
        }

        self.efficiency.validate()?;
        self.cadence.validate()?;
        Ok(())
    }

    pub fn learning_curve(&self) -> LearningCurve {
        LearningCurve::new(
            self.launch_cost_initial,
            self.launch_cost_floor,
            self.learning_rate,
        )
    }

    pub fn emission_tax(&self) -> EmissionTax {
        EmissionTax::new(self.emission_factor, self.carbon_tax)
    }

    pub fn year_of(&self, period: usize) -> f64 {
        f64::from(self.start_year) + period as f64
    }

    /// Elevator capacity before availability losses in `period`.
    pub fn nominal_elevator_capacity(&self, period: usize) -> f64 {
        self.elevator_capacity * (1.0 + self.elevator_growth_rate).powf(period as f64)
    }

    /// Fraction of the base demand still shipped from Earth in `period`.
    pub fn earth_demand_fraction(&self, period: usize) -> f64 {
        match &self.isru {
            Some(isru) => 1.0 - isru.share(period as f64),
            None => 1.0,
        }
    }
}
