use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Poisson, StandardNormal};

/// Random draws used by the noise models.
///
/// Production code uses [`RngNoise`]; tests plug in deterministic sources.
pub trait NoiseSource {
    /// A sample from Normal(`mean`, `std_dev`).
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    /// A uniform index in `[0, bound)`. `bound` is never zero.
    fn index(&mut self, bound: usize) -> usize;

    /// A sample from Poisson(`lambda`) with `lambda` finite and non-negative.
    fn poisson(&mut self, lambda: f64) -> f64;
}

#[derive(Debug, Clone)]
pub struct RngNoise<R> {
    rng: R,
}

impl<R: Rng> RngNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngNoise<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> NoiseSource for RngNoise<R> {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }

    fn index(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }

    fn poisson(&mut self, lambda: f64) -> f64 {
        if lambda <= 0.0 {
            return 0.0;
        }

        match Poisson::new(lambda) {
            Ok(dist) => dist.sample(&mut self.rng),
            // Beyond the sampler's range, use the Gaussian approximation
            Err(_) => self.normal(lambda, lambda.sqrt()).max(0.0),
        }
    }
}
