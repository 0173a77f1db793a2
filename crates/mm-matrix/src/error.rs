use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatmulError {
    #[error("matmul dimension mismatch: [{n}x{m}] @ [{m2}x{p}]")]
    DimensionMismatch {
        n: usize,
        m: usize,
        m2: usize,
        p: usize,
    },
    #[error("invalid shape [{rows}x{cols}]: dimensions must be positive and rows*cols must fit in memory")]
    InvalidShape { rows: usize, cols: usize },
    #[error("storage of length {len} does not match shape [{rows}x{cols}]")]
    StorageLength { rows: usize, cols: usize, len: usize },
    #[error("backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },
    #[error("compute failure: {0}")]
    ComputeFailure(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MatmulError {
    pub(crate) fn unavailable(backend: &str, reason: impl Into<String>) -> Self {
        MatmulError::BackendUnavailable {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatmulError>;
