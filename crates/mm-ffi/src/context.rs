use mm_matrix::{Multiplier, MultiplierConfig, Result};

/// Opaque context handle that owns a configured multiplier.
pub struct MMContext {
    pub multiplier: Multiplier,
}

impl MMContext {
    pub fn new(config: MultiplierConfig) -> Result<Self> {
        Ok(Self {
            multiplier: Multiplier::new(config)?,
        })
    }
}
