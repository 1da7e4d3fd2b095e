//! Type definitions for MST property-based tests.

use crate::DistanceMatrix;

/// Weight distribution strategy for generated complete graphs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum WeightDistribution {
    /// Independent weights drawn from a continuous range.
    Unique,
    /// Weights drawn from a tiny set, stressing lowest-index tie-breaking.
    ManyIdentical,
    /// Euclidean distances between random planar points.
    Geometric,
}

/// Fixture for MST property tests.
#[derive(Clone, Debug)]
pub(super) struct MstFixture {
    /// Symmetric distance matrix with a zero diagonal.
    pub distances: DistanceMatrix,
    /// Weight distribution used during generation.
    pub distribution: WeightDistribution,
}

impl MstFixture {
    /// Number of nodes in the complete graph.
    pub(super) fn node_count(&self) -> usize {
        self.distances.rows()
    }
}
