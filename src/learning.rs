//! Wright's-law launch cost with a physical cost floor.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningCurve {
    /// Cost of the first launch
    pub initial_cost: f64,
    /// Unit cost never drops below this
    pub floor_cost: f64,
    /// Cost multiplier per doubling of cumulative launches, in (0, 1)
    pub learning_rate: f64,
}

impl LearningCurve {
    pub fn new(initial_cost: f64, floor_cost: f64, learning_rate: f64) -> Self {
        Self {
            initial_cost,
            floor_cost,
            learning_rate,
        }
    }

    pub fn exponent(&self) -> f64 {
        self.learning_rate.log2()
    }

    /// Unit cost after `cumulative` launches. Counts below one are
    /// treated as one so the negative exponent never sees a zero base.
    pub fn unit_cost(&self, cumulative: f64) -> f64 {
        let n = cumulative.max(1.0);
        (self.initial_cost * n.powf(self.exponent())).max(self.floor_cost)
    }

    /// Cost of `n_new` launches after `n_start`, priced at the batch midpoint.
    pub fn batch_cost(&self, n_start: f64, n_new: f64) -> f64 {
        if n_new <= 0.0 {
            return 0.0;
        }
        n_new * self.unit_cost(n_start + n_new / 2.0)
    }
}
