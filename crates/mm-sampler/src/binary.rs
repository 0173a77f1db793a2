use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sampler::MatrixSampler;

/// Uniform 0/1 entries, drawn as integers and cast to f32.
pub struct BinarySampler {
    rng: StdRng,
}

impl BinarySampler {
    /// Create a sampler with a fixed seed for reproducible inputs.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl MatrixSampler for BinarySampler {
    fn name(&self) -> &str {
        "binary"
    }

    fn next_value(&mut self) -> f32 {
        self.rng.gen_range(0..2i32) as f32
    }
}
