use mm_matrix::{BackendKind, MatmulError};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MMStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorDimensionMismatch = 2,
    ErrorInvalidShape = 3,
    ErrorBackendUnavailable = 4,
    ErrorComputeFailure = 5,
    ErrorInternal = 6,
}

impl From<&MatmulError> for MMStatus {
    fn from(e: &MatmulError) -> Self {
        match e {
            MatmulError::DimensionMismatch { .. } => MMStatus::ErrorDimensionMismatch,
            MatmulError::InvalidShape { .. } => MMStatus::ErrorInvalidShape,
            MatmulError::StorageLength { .. } | MatmulError::InvalidConfig(_) => {
                MMStatus::ErrorInvalidArgument
            }
            MatmulError::BackendUnavailable { .. } => MMStatus::ErrorBackendUnavailable,
            MatmulError::ComputeFailure(_) => MMStatus::ErrorComputeFailure,
        }
    }
}

/// Compute backend type selector.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum MMBackendType {
    Auto = 0,
    Sequential = 1,
    Parallel = 2,
    Metal = 3,
}

impl From<MMBackendType> for BackendKind {
    fn from(b: MMBackendType) -> Self {
        match b {
            MMBackendType::Auto => BackendKind::Auto,
            MMBackendType::Sequential => BackendKind::Sequential,
            MMBackendType::Parallel => BackendKind::Parallel,
            MMBackendType::Metal => BackendKind::Metal,
        }
    }
}
