use log::debug;
use mm_matrix::{MatmulError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::sampler::MatrixSampler;

/// Normally distributed entries.
pub struct GaussianSampler {
    rng: StdRng,
    mean: f32,
    std_dev: f32,
}

impl GaussianSampler {
    /// Create a sampler drawing from N(mean, std_dev^2).
    ///
    /// # Errors
    /// `InvalidConfig` if `std_dev` is negative or not finite.
    pub fn new(mean: f32, std_dev: f32, seed: u64) -> Result<Self> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(MatmulError::InvalidConfig(format!(
                "normal({}, {}): mean and std_dev must be finite, std_dev non-negative",
                mean, std_dev
            )));
        }
        debug!("gaussian sampler: mean={} std_dev={} seed={}", mean, std_dev, seed);
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            mean,
            std_dev,
        })
    }

    /// Standard normal N(0, 1).
    pub fn standard(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mean: 0.0,
            std_dev: 1.0,
        }
    }
}

impl MatrixSampler for GaussianSampler {
    fn name(&self) -> &str {
        "gaussian"
    }

    fn next_value(&mut self) -> f32 {
        let z: f32 = self.rng.sample(StandardNormal);
        self.mean + self.std_dev * z
    }
}
