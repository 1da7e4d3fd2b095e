//! Distance values and the errors metrics report.

use core::{fmt, ops::Deref};

use thiserror::Error;

use crate::error::define_error_codes;

/// Which argument of a distance call an error refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorKind {
    /// Value originating from the first argument.
    Left,
    /// Value originating from the second argument.
    Right,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors emitted while computing distances.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch { left: usize, right: usize },
    /// Encountered a non-finite value in one of the vectors.
    #[error("{which} vector contains a non-finite value at index {index}: {value}")]
    NonFinite {
        which: VectorKind,
        index: usize,
        value: f32,
    },
    /// Cosine distance is undefined for zero-magnitude vectors.
    #[error("{which} vector has zero magnitude")]
    ZeroMagnitude { which: VectorKind },
    /// A ratio metric had a zero denominator over the whole vector.
    #[error("{metric} distance is undefined: denominator is zero")]
    ZeroDenominator { metric: &'static str },
    /// A metric produced a value that cannot be used as an edge weight.
    #[error("metric `{metric}` produced an invalid distance {value}")]
    InvalidOutput { metric: String, value: f32 },
    /// No metric is registered under the requested name.
    #[error("no metric is registered under `{name}`")]
    UnknownMetric { name: String },
    /// A plugin metric reported its own failure.
    #[error("metric `{metric}` failed: {reason}")]
    Plugin { metric: String, reason: String },
}

define_error_codes! {
    /// Stable codes describing [`DistanceError`] variants.
    enum DistanceErrorCode for DistanceError {
        /// Either input vector had zero length.
        ZeroLength => ZeroLength => "DISTANCE_ZERO_LENGTH",
        /// Input vectors had different lengths.
        DimensionMismatch => DimensionMismatch { .. } => "DISTANCE_DIMENSION_MISMATCH",
        /// Encountered a non-finite input value.
        NonFinite => NonFinite { .. } => "DISTANCE_NON_FINITE",
        /// Cosine distance of a zero-magnitude vector.
        ZeroMagnitude => ZeroMagnitude { .. } => "DISTANCE_ZERO_MAGNITUDE",
        /// A ratio metric had a zero denominator.
        ZeroDenominator => ZeroDenominator { .. } => "DISTANCE_ZERO_DENOMINATOR",
        /// A metric produced an unusable value.
        InvalidOutput => InvalidOutput { .. } => "DISTANCE_INVALID_OUTPUT",
        /// No metric is registered under the requested name.
        UnknownMetric => UnknownMetric { .. } => "DISTANCE_UNKNOWN_METRIC",
        /// A plugin metric reported its own failure.
        Plugin => Plugin { .. } => "DISTANCE_PLUGIN_FAILURE",
    }
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

/// A dissimilarity between two vectors.
///
/// Built-in metrics only produce finite, non-negative values; plugin results
/// are checked by the fallback chain before use.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Distance(f32);

impl Distance {
    /// Wraps a raw value reported by a metric.
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Returns the raw distance value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Deref for Distance {
    type Target = f32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
