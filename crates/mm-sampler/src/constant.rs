use crate::sampler::MatrixSampler;

/// Fills every element with the same value.
pub struct ConstantSampler {
    value: f32,
}

impl ConstantSampler {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl MatrixSampler for ConstantSampler {
    fn name(&self) -> &str {
        "constant"
    }

    fn next_value(&mut self) -> f32 {
        self.value
    }
}
