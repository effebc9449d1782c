//! Rocket fleet throughput ceiling (beta).

use serde::{Deserialize, Serialize};

use crate::{invalid, LogisticsError};

/// Logistic growth of launches per site per year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchCadence {
    /// Saturation cadence per site [launches/yr]
    pub max_per_site: f64,
    /// Logistic steepness [1/yr]
    pub steepness: f64,
    /// Year of half-saturation
    pub midpoint_year: f64,
}

impl Default for LaunchCadence {
    fn default() -> Self {
        Self {
            max_per_site: 400.0,
            steepness: 0.15,
            midpoint_year: 2030.0,
        }
    }
}

impl LaunchCadence {
    pub fn validate(&self) -> Result<(), LogisticsError> {
        if !(self.max_per_site.is_finite() && self.max_per_site >= 0.0) {
            return Err(invalid("max_per_site must be finite and >= 0"));
        }
        if !(self.steepness.is_finite() && self.steepness >= 0.0) {
            return Err(invalid("cadence steepness must be finite and >= 0"));
        }
        if !self.midpoint_year.is_finite() {
            return Err(invalid("cadence midpoint_year must be finite"));
        }
        Ok(())
    }

    pub fn per_site(&self, year: f64) -> f64 {
        self.max_per_site / (1.0 + (-self.steepness * (year - self.midpoint_year)).exp())
    }

    /// Physical mass ceiling [t/yr] for `sites` active launch sites.
    pub fn capacity(&self, year: f64, sites: usize, payload_per_launch: f64) -> f64 {
        (self.per_site(year) * sites as f64 * payload_per_launch).max(0.0)
    }
}
