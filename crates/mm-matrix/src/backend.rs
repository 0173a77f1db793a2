use std::fmt::Debug;

use crate::config::BackendKind;
use crate::error::Result;
use crate::shape::MatmulDims;

/// Trait for pluggable matrix multiplication backends (CPU, rayon, Metal).
///
/// Data is passed in as row-major `f32` slices and the product is returned as
/// an owned vector. Callers validate shapes first; backends still check that
/// slice lengths agree with `dims` and reject anything that does not.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "sequential", "metal").
    fn name(&self) -> &str;

    /// Which [`BackendKind`] this backend implements.
    fn kind(&self) -> BackendKind;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: row-major data of shape [n, m]
    /// - `b`: row-major data of shape [m, p]
    /// - Returns: row-major data of shape [n, p]
    ///
    /// On error no partial output is returned.
    fn matmul(&self, a: &[f32], b: &[f32], dims: MatmulDims) -> Result<Vec<f32>>;
}
