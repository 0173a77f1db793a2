use std::sync::OnceLock;

use log::{debug, info, warn};

use crate::backend::ComputeBackend;
use crate::config::{BackendKind, MultiplierConfig};
use crate::cpu::{CpuBackend, ParallelBackend};
use crate::error::{MatmulError, Result};
use crate::matrix::{Matrix, MatrixView};
use crate::shape::MatmulDims;

/// Dense matrix multiplier bound to one execution backend.
///
/// The backend and everything it holds (thread pool, device context, compiled
/// kernel) is acquired in [`Multiplier::new`] and released when the multiplier
/// is dropped.
#[derive(Debug)]
pub struct Multiplier {
    config: MultiplierConfig,
    backend: Box<dyn ComputeBackend>,
}

impl Multiplier {
    /// Create a multiplier for the backend named in `config`.
    ///
    /// `BackendKind::Auto` takes the first backend that initialises, trying
    /// metal, then parallel, then sequential. An explicitly requested backend
    /// that cannot be initialised is an error; there is no fallback.
    pub fn new(config: MultiplierConfig) -> Result<Self> {
        config.validate()?;
        let backend = build_backend(&config)?;
        info!(
            "matmul backend '{}' selected (requested: {})",
            backend.name(),
            config.backend
        );
        Ok(Self { config, backend })
    }

    /// Wrap an already constructed backend.
    ///
    /// `config.backend` is overwritten with the backend's own kind so that
    /// [`Multiplier::config`] always describes what is actually running.
    pub fn with_backend(mut config: MultiplierConfig, backend: Box<dyn ComputeBackend>) -> Self {
        config.backend = backend.kind();
        Self { config, backend }
    }

    pub fn config(&self) -> &MultiplierConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    /// The backend actually in use (never `Auto`).
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Compute `a @ b`.
    ///
    /// # Errors
    /// - `InvalidShape` if any dimension is zero
    /// - `DimensionMismatch` if `a.cols() != b.rows()`
    /// - `ComputeFailure` if the backend fails mid-dispatch or returns a
    ///   result of the wrong size
    pub fn multiply<'a, 'b>(
        &self,
        a: impl Into<MatrixView<'a>>,
        b: impl Into<MatrixView<'b>>,
    ) -> Result<Matrix> {
        let (a, b) = (a.into(), b.into());
        let dims = MatmulDims::from_shapes(a.shape(), b.shape())?;
        debug!("multiply {} on '{}'", dims, self.backend.name());

        let data = self.backend.matmul(a.data(), b.data(), dims)?;
        if data.len() != dims.out_len() {
            return Err(MatmulError::ComputeFailure(format!(
                "backend '{}' returned {} elements, expected {}",
                self.backend.name(),
                data.len(),
                dims.out_len()
            )));
        }
        Matrix::new(data, dims.out_shape())
    }
}

/// Compute `a @ b` with a process-wide multiplier using the default
/// configuration (`BackendKind::Auto`).
pub fn multiply<'a, 'b>(
    a: impl Into<MatrixView<'a>>,
    b: impl Into<MatrixView<'b>>,
) -> Result<Matrix> {
    static DEFAULT: OnceLock<Result<Multiplier>> = OnceLock::new();
    match DEFAULT.get_or_init(|| Multiplier::new(MultiplierConfig::default())) {
        Ok(multiplier) => multiplier.multiply(a, b),
        Err(e) => Err(e.clone()),
    }
}

fn build_backend(config: &MultiplierConfig) -> Result<Box<dyn ComputeBackend>> {
    match config.backend {
        BackendKind::Sequential => Ok(Box::new(CpuBackend::new())),
        BackendKind::Parallel => Ok(Box::new(ParallelBackend::new(
            config.num_threads,
            config.rows_per_task,
        )?)),
        BackendKind::Metal => metal_backend(config),
        BackendKind::Auto => {
            match metal_backend(config) {
                Ok(backend) => return Ok(backend),
                Err(e) => warn!("auto backend: skipping metal: {}", e),
            }
            match ParallelBackend::new(config.num_threads, config.rows_per_task) {
                Ok(backend) => return Ok(Box::new(backend)),
                Err(e) => warn!("auto backend: skipping parallel: {}", e),
            }
            Ok(Box::new(CpuBackend::new()))
        }
    }
}

#[cfg(feature = "metal")]
fn metal_backend(config: &MultiplierConfig) -> Result<Box<dyn ComputeBackend>> {
    let backend = crate::metal::MetalBackend::new(config.device_index, config.log_kernel_build)?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "metal"))]
fn metal_backend(_config: &MultiplierConfig) -> Result<Box<dyn ComputeBackend>> {
    Err(MatmulError::unavailable(
        "metal",
        "built without the `metal` feature",
    ))
}
