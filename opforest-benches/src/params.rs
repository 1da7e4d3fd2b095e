//! Benchmark parameter types.

use std::fmt;

/// Size of a synthetic workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkloadParams {
    /// Training samples per class.
    pub per_class: usize,
    /// Feature dimension.
    pub dimension: usize,
}

impl WorkloadParams {
    /// Total training samples across both classes.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.per_class.saturating_mul(2)
    }
}

impl fmt::Display for WorkloadParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},d={}", self.samples(), self.dimension)
    }
}
