pub mod matmul;
pub mod parallel;

pub use parallel::ParallelBackend;

use crate::backend::ComputeBackend;
use crate::config::BackendKind;
use crate::error::Result;
use crate::shape::MatmulDims;

/// Pure-Rust single-threaded backend.
///
/// Runs the canonical triple loop. Intended as the reference every other
/// backend is checked against.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "sequential"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn matmul(&self, a: &[f32], b: &[f32], dims: MatmulDims) -> Result<Vec<f32>> {
        dims.check_operands(a, b)?;
        let mut c = vec![0.0f32; dims.out_len()];
        matmul::matmul_rows(a, b, dims, 0, &mut c);
        Ok(c)
    }
}
