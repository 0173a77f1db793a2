//! `mm-matrix` - Dense f32 matrix multiplication with pluggable backends.
//!
//! This crate provides:
//! - `Matrix` / `MatrixView`: row-major f32 matrices with checked shapes
//! - A `ComputeBackend` trait for pluggable compute (sequential, parallel, Metal)
//! - `Multiplier`, configured explicitly through `MultiplierConfig`
//! - A free `multiply` function using the default configuration

pub mod backend;
pub mod config;
pub mod cpu;
pub mod error;
pub mod matrix;
#[cfg(feature = "metal")]
pub mod metal;
pub mod multiplier;
pub mod shape;

// Re-export primary types at the crate root for convenience.
pub use backend::ComputeBackend;
pub use config::{BackendKind, MultiplierConfig};
pub use cpu::{CpuBackend, ParallelBackend};
pub use error::{MatmulError, Result};
pub use matrix::{Matrix, MatrixView};
#[cfg(feature = "metal")]
pub use metal::MetalBackend;
pub use multiplier::{multiply, Multiplier};
pub use shape::{MatmulDims, Shape};
