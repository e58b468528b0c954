//! Benchmark setup error type.

use bqpgen_core::BqpError;

use crate::hardware::HardwareConfigError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// The damaged-lattice configuration was rejected.
    #[error("hardware configuration rejected: {0}")]
    Hardware(#[from] HardwareConfigError),
    /// Topology construction or generation failed.
    #[error("bqpgen operation failed: {0}")]
    Core(#[from] BqpError),
}
