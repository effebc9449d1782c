//! Rocket emissions and carbon tax.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionTax {
    /// t CO2e emitted per t of rocket payload
    pub emission_factor: f64,
    /// $ per t CO2e
    pub tax_rate: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionAssessment {
    pub emissions: f64,
    pub tax: f64,
}

impl EmissionTax {
    pub fn new(emission_factor: f64, tax_rate: f64) -> Self {
        Self {
            emission_factor,
            tax_rate,
        }
    }

    pub fn emissions(&self, rocket_cargo: f64) -> f64 {
        rocket_cargo * self.emission_factor
    }

    pub fn tax(&self, emissions: f64) -> f64 {
        emissions * self.tax_rate
    }

    pub fn assess(&self, rocket_cargo: f64) -> EmissionAssessment {
        let emissions = self.emissions(rocket_cargo);
        EmissionAssessment {
            emissions,
            tax: self.tax(emissions),
        }
    }
}
