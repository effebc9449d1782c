//! Injected randomness for the stochastic engines.

use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

/// Draws needed by the Monte Carlo and surge engines. Every `rand::Rng`
/// implements it, so a seeded generator makes runs reproducible.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;
    fn poisson(&mut self, mean: f64) -> u64;
    /// Seed for an independent child stream.
    fn fork_seed(&mut self) -> u64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(self),
            Err(_) => mean,
        }
    }

    fn poisson(&mut self, mean: f64) -> u64 {
        if mean <= 0.0 {
            return 0;
        }
        match Poisson::new(mean) {
            Ok(dist) => dist.sample(self) as u64,
            Err(_) => 0,
        }
    }

    fn fork_seed(&mut self) -> u64 {
        self.gen::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::RandomSource;

    #[test]
    fn seeded_sources_repeat() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(a.normal(0.16, 0.05), b.normal(0.16, 0.05));
            assert_eq!(a.poisson(0.833), b.poisson(0.833));
        }
    }

    #[test]
    fn degenerate_parameters_do_not_panic() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(rng.normal(3.0, 0.0), 3.0);
        assert_eq!(rng.poisson(0.0), 0);
        let u = rng.uniform();
        assert!((0.0..1.0).contains(&u));
    }
}
