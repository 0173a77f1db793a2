use crate::error::{MatmulError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which execution backend a [`Multiplier`](crate::Multiplier) should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// First available of metal, parallel, sequential.
    #[default]
    Auto,
    /// Single-threaded reference triple loop.
    Sequential,
    /// Row-tiled rayon workers on the CPU.
    Parallel,
    /// GPU compute through Metal (requires the `metal` feature).
    Metal,
}

impl BackendKind {
    /// Every backend kind, in declaration order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Auto,
        BackendKind::Sequential,
        BackendKind::Parallel,
        BackendKind::Metal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Auto => "auto",
            BackendKind::Sequential => "sequential",
            BackendKind::Parallel => "parallel",
            BackendKind::Metal => "metal",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "sequential" | "cpu" | "reference" => Ok(BackendKind::Sequential),
            "parallel" => Ok(BackendKind::Parallel),
            "metal" | "gpu" => Ok(BackendKind::Metal),
            other => Err(MatmulError::InvalidConfig(format!(
                "unknown backend '{}'",
                other
            ))),
        }
    }
}

/// Configuration for a [`Multiplier`](crate::Multiplier).
///
/// Passed explicitly at construction time; nothing is read from the
/// environment, so instances with different backends can live side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierConfig {
    /// Execution backend to use.
    pub backend: BackendKind,
    /// Worker threads for the parallel backend. `None` uses rayon's default.
    pub num_threads: Option<usize>,
    /// Output rows handed to each parallel work item.
    pub rows_per_task: usize,
    /// Metal device to open. `None` uses the system default device.
    pub device_index: Option<usize>,
    /// Log kernel compilation details when a device backend starts.
    pub log_kernel_build: bool,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            num_threads: None,
            rows_per_task: 16,
            device_index: None,
            log_kernel_build: false,
        }
    }
}

impl MultiplierConfig {
    /// Default configuration pinned to one backend.
    pub fn with_backend(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows_per_task == 0 {
            return Err(MatmulError::InvalidConfig(
                "rows_per_task must be positive".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(MatmulError::InvalidConfig(
                "num_threads must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MultiplierConfig::default();
        assert_eq!(c.backend, BackendKind::Auto);
        assert_eq!(c.rows_per_task, 16);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("auto".parse::<BackendKind>().unwrap(), BackendKind::Auto);
        assert_eq!(
            " Parallel ".parse::<BackendKind>().unwrap(),
            BackendKind::Parallel
        );
        assert_eq!(
            "reference".parse::<BackendKind>().unwrap(),
            BackendKind::Sequential
        );
        assert_eq!("gpu".parse::<BackendKind>().unwrap(), BackendKind::Metal);
        assert!(matches!(
            "opencl".parse::<BackendKind>(),
            Err(MatmulError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_display_matches_parse() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_validate_rejects_zero() {
        let c = MultiplierConfig {
            rows_per_task: 0,
            ..MultiplierConfig::default()
        };
        assert!(c.validate().is_err());

        let c = MultiplierConfig {
            num_threads: Some(0),
            ..MultiplierConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_serde_partial_json() {
        let c: MultiplierConfig =
            serde_json::from_str(r#"{"backend":"parallel","num_threads":4}"#).unwrap();
        assert_eq!(c.backend, BackendKind::Parallel);
        assert_eq!(c.num_threads, Some(4));
        assert_eq!(c.rows_per_task, 16);
        assert!(!c.log_kernel_build);

        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains(r#""backend":"parallel""#));
    }
}
