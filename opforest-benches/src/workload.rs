//! Deterministic two-class workloads for the benchmarks.

use opforest_core::{FeatureMatrix, OpfBuilder, OpfClassifier};
use opforest_test_support::datasets::two_clusters;

use crate::{error::BenchSetupError, params::WorkloadParams};

/// Seed used for all synthetic data generation.
pub const SEED: u64 = 42;

const SEPARATION: f32 = 6.0;
const SPREAD: f32 = 1.5;

/// Training and test data drawn from the same two Gaussian-like clusters.
#[derive(Clone, Debug)]
pub struct Workload {
    /// Training features.
    pub train: FeatureMatrix,
    /// Training labels, one per row of `train`.
    pub labels: Vec<i64>,
    /// Held-out features of the same dimension.
    pub test: FeatureMatrix,
}

impl Workload {
    /// Generates a workload of the requested size. The test set has as many
    /// rows as the training set.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::Data`] when `params` describes an empty or
    /// zero-dimensional matrix.
    pub fn generate(params: WorkloadParams) -> Result<Self, BenchSetupError> {
        let samples = two_clusters(
            params.per_class.saturating_mul(2),
            params.dimension,
            SEPARATION,
            SPREAD,
            SEED,
        );
        let (train, test) = samples.split_pairs();
        Ok(Self {
            train: FeatureMatrix::try_from_rows(&train.features)?,
            labels: train.labels,
            test: FeatureMatrix::try_from_rows(&test.features)?,
        })
    }

    /// Trains a Euclidean classifier on the workload.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::Classifier`] if training fails.
    pub fn trained_classifier(&self) -> Result<OpfClassifier, BenchSetupError> {
        let mut classifier = OpfBuilder::new().build()?;
        classifier.fit_matrix(self.train.clone(), &self.labels)?;
        Ok(classifier)
    }
}
