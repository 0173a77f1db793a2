use std::panic::{self, AssertUnwindSafe};

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::backend::ComputeBackend;
use crate::config::BackendKind;
use crate::cpu::matmul::matmul_rows;
use crate::error::{MatmulError, Result};
use crate::shape::MatmulDims;

/// Data-parallel CPU backend.
///
/// The output is split into bands of `rows_per_task` rows and each band is
/// computed by one rayon task. Bands never overlap, so workers share `a` and
/// `b` read-only and write without locks. `install` returning is the barrier
/// after which the product is complete.
#[derive(Debug)]
pub struct ParallelBackend {
    pool: ThreadPool,
    rows_per_task: usize,
}

impl ParallelBackend {
    /// Build a backend with its own thread pool.
    ///
    /// `num_threads = None` lets rayon pick (one thread per logical core).
    ///
    /// # Errors
    /// `InvalidConfig` if `rows_per_task` is zero, `BackendUnavailable` if the
    /// thread pool cannot be created.
    pub fn new(num_threads: Option<usize>, rows_per_task: usize) -> Result<Self> {
        if rows_per_task == 0 {
            return Err(MatmulError::InvalidConfig(
                "rows_per_task must be positive".to_string(),
            ));
        }
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("mm-worker-{}", i));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| MatmulError::unavailable("parallel", e.to_string()))?;
        Ok(Self {
            pool,
            rows_per_task,
        })
    }

    /// Number of worker threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn rows_per_task(&self) -> usize {
        self.rows_per_task
    }
}

impl ComputeBackend for ParallelBackend {
    fn name(&self) -> &str {
        "parallel"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Parallel
    }

    fn matmul(&self, a: &[f32], b: &[f32], dims: MatmulDims) -> Result<Vec<f32>> {
        self.run_bands(a, b, dims, matmul_rows)
    }
}

impl ParallelBackend {
    /// Split the output into row bands and run `kernel` on each band.
    ///
    /// `kernel(a, b, dims, row_start, out)` fills `out` with the rows starting
    /// at `row_start`. A panic in any band fails the whole product.
    fn run_bands<K>(&self, a: &[f32], b: &[f32], dims: MatmulDims, kernel: K) -> Result<Vec<f32>>
    where
        K: Fn(&[f32], &[f32], MatmulDims, usize, &mut [f32]) + Sync,
    {
        dims.check_operands(a, b)?;
        // Never more rows than the output has; with out_len validated this
        // product cannot overflow.
        let rows_per_task = self.rows_per_task.min(dims.n);
        let band = rows_per_task * dims.p;
        debug!(
            "parallel matmul {}: {} bands of {} rows on {} threads",
            dims,
            dims.n.div_ceil(rows_per_task),
            rows_per_task,
            self.num_threads()
        );

        let mut c = vec![0.0f32; dims.out_len()];
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool.install(|| {
                c.par_chunks_mut(band)
                    .enumerate()
                    .for_each(|(t, out)| kernel(a, b, dims, t * rows_per_task, out));
            })
        }))
        .map_err(|payload| MatmulError::ComputeFailure(panic_message(payload.as_ref())))?;
        Ok(c)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}
