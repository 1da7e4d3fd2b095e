//! Distance metrics, the per-classifier metric registry and the three-tier
//! fallback chain that turns feature matrices into distance matrices.
//!
//! Built-in metrics validate their inputs and surface detailed errors so the
//! chain can decide whether to fall back to the next tier.

mod chain;
mod cosine;
mod elementwise;
mod euclidean;
mod helpers;
mod matrix;
mod metric;
mod types;

pub use self::chain::{
    MetricAttempt, MetricChain, MetricChainError, MetricChainErrorCode, MetricOutcome,
};
pub use self::cosine::cosine_distance;
pub use self::elementwise::{
    braycurtis_distance, canberra_distance, chebyshev_distance, cityblock_distance,
};
pub use self::euclidean::{euclidean_distance, squared_euclidean_distance};
pub use self::matrix::DistanceMatrix;
pub use self::metric::{BuiltinMetric, DistanceMetric, FnMetric, MetricRegistry};
pub use self::types::{Distance, DistanceError, DistanceErrorCode, VectorKind};
