//! Ordered metric fallback: primary, optional named fallback, then Euclidean.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, warn};

use super::matrix::DistanceMatrix;
use super::metric::{BuiltinMetric, DistanceMetric, MetricRegistry};
use super::types::DistanceError;
use crate::{error::define_error_codes, matrix::FeatureMatrix};

/// One failed tier of a [`MetricChain`].
#[derive(Clone, Debug, PartialEq)]
pub struct MetricAttempt {
    /// Name the tier was configured with.
    pub metric: String,
    /// Why the tier was abandoned.
    pub error: DistanceError,
}

impl fmt::Display for MetricAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.metric, self.error)
    }
}

/// Error returned when no tier of a [`MetricChain`] produced a usable matrix.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MetricChainError {
    /// Every tier failed, in chain order.
    #[error("every metric in the fallback chain failed: {}", describe(.attempts))]
    Exhausted {
        /// One entry per attempted tier.
        attempts: Vec<MetricAttempt>,
    },
}

define_error_codes! {
    /// Stable codes describing [`MetricChainError`] variants.
    enum MetricChainErrorCode for MetricChainError {
        /// Every tier of the chain failed.
        Exhausted => Exhausted { .. } => "METRIC_CHAIN_EXHAUSTED",
    }
}

impl MetricChainError {
    /// Returns the failed attempts in chain order.
    #[must_use]
    pub fn attempts(&self) -> &[MetricAttempt] {
        match self {
            Self::Exhausted { attempts } => attempts,
        }
    }
}

fn describe(attempts: &[MetricAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A distance matrix together with the metric that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricOutcome {
    /// The computed distances.
    pub matrix: DistanceMatrix,
    /// Name of the tier that succeeded.
    pub metric: String,
}

#[derive(Clone, Debug)]
struct Tier {
    role: &'static str,
    name: String,
    metric: Option<Arc<dyn DistanceMetric>>,
}

impl Tier {
    fn resolve(registry: &MetricRegistry, role: &'static str, name: &str) -> Self {
        Self {
            role,
            name: name.to_owned(),
            metric: registry.resolve(name),
        }
    }
}

/// Three-tier metric evaluation.
///
/// Tiers are tried in order and the first one that yields a complete matrix of
/// finite, non-negative distances wins. A tier fails when its name is not
/// registered or when any single distance errors. The last tier is always the
/// built-in Euclidean metric, independent of the registry contents.
///
/// # Examples
/// ```
/// use opforest_core::{FeatureMatrix, MetricChain, MetricRegistry};
///
/// let registry = MetricRegistry::with_builtins();
/// let chain = MetricChain::resolve(&registry, "missing", Some("cityblock"));
/// assert_eq!(
///     chain.tier_names().collect::<Vec<_>>(),
///     ["missing", "cityblock", "euclidean"],
/// );
///
/// let data = FeatureMatrix::try_from_rows(&[[0.0, 0.0], [3.0, 4.0]])?;
/// let outcome = chain.pairwise(&data)?;
/// assert_eq!(outcome.metric, "cityblock");
/// assert_eq!(outcome.matrix.get(0, 1), Some(7.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct MetricChain {
    tiers: Vec<Tier>,
}

impl MetricChain {
    /// Resolves the configured names against `registry`.
    ///
    /// Unknown names are kept and fail when the chain is evaluated, so the
    /// failure is reported alongside the other attempts.
    #[must_use]
    pub fn resolve(registry: &MetricRegistry, primary: &str, fallback: Option<&str>) -> Self {
        let mut tiers = vec![Tier::resolve(registry, "primary", primary)];
        if let Some(fallback) = fallback {
            tiers.push(Tier::resolve(registry, "fallback", fallback));
        }
        tiers.push(Tier {
            role: "default",
            name: BuiltinMetric::Euclidean.as_str().to_owned(),
            metric: Some(Arc::new(BuiltinMetric::Euclidean)),
        });
        Self { tiers }
    }

    /// Iterates over the configured tier names in evaluation order.
    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.tiers.iter().map(|tier| tier.name.as_str())
    }

    /// Computes the symmetric `n × n` matrix over the rows of `data`.
    ///
    /// Only the upper triangle is evaluated; the diagonal is zero.
    ///
    /// # Errors
    /// Returns [`MetricChainError::Exhausted`] when every tier fails.
    pub fn pairwise(&self, data: &FeatureMatrix) -> Result<MetricOutcome, MetricChainError> {
        let n = data.rows();
        self.evaluate(|metric| {
            let upper = evaluate_rows(n, |i| {
                let left = row_of(data, i);
                (i + 1..n)
                    .map(|j| checked_distance(metric, left, row_of(data, j)))
                    .collect()
            })?;
            Ok(DistanceMatrix::from_upper_triangle(&upper))
        })
    }

    /// Computes the `m × n` matrix from each query row to each reference row.
    ///
    /// # Errors
    /// Returns [`MetricChainError::Exhausted`] when every tier fails.
    pub fn cross(
        &self,
        queries: &FeatureMatrix,
        references: &FeatureMatrix,
    ) -> Result<MetricOutcome, MetricChainError> {
        self.evaluate(|metric| {
            let rows = evaluate_rows(queries.rows(), |i| {
                let query = row_of(queries, i);
                references
                    .iter_rows()
                    .map(|reference| checked_distance(metric, query, reference))
                    .collect()
            })?;
            Ok(DistanceMatrix::from_row_vectors(rows, references.rows()))
        })
    }

    fn evaluate<F>(&self, compute: F) -> Result<MetricOutcome, MetricChainError>
    where
        F: Fn(&dyn DistanceMetric) -> Result<DistanceMatrix, DistanceError>,
    {
        let mut attempts = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let result = match &tier.metric {
                Some(metric) => compute(metric.as_ref()),
                None => Err(DistanceError::UnknownMetric {
                    name: tier.name.clone(),
                }),
            };
            match result {
                Ok(matrix) => {
                    debug!(
                        metric = %tier.name,
                        tier = tier.role,
                        rows = matrix.rows(),
                        cols = matrix.cols(),
                        "distance matrix computed"
                    );
                    return Ok(MetricOutcome {
                        matrix,
                        metric: tier.name.clone(),
                    });
                }
                Err(error) => {
                    warn!(
                        metric = %tier.name,
                        tier = tier.role,
                        code = %error.code(),
                        %error,
                        "metric tier failed, trying the next tier"
                    );
                    attempts.push(MetricAttempt {
                        metric: tier.name.clone(),
                        error,
                    });
                }
            }
        }
        Err(MetricChainError::Exhausted { attempts })
    }
}

fn row_of(matrix: &FeatureMatrix, index: usize) -> &[f32] {
    matrix.row(index).unwrap_or_default()
}

fn checked_distance(
    metric: &dyn DistanceMetric,
    left: &[f32],
    right: &[f32],
) -> Result<f32, DistanceError> {
    let value = metric.distance(left, right)?.value();
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DistanceError::InvalidOutput {
            metric: metric.name().to_owned(),
            value,
        })
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_rows<F>(rows: usize, row: F) -> Result<Vec<Vec<f32>>, DistanceError>
where
    F: Fn(usize) -> Result<Vec<f32>, DistanceError>,
{
    (0..rows).map(row).collect()
}

#[cfg(feature = "parallel")]
fn evaluate_rows<F>(rows: usize, row: F) -> Result<Vec<Vec<f32>>, DistanceError>
where
    F: Fn(usize) -> Result<Vec<f32>, DistanceError> + Sync + Send,
{
    use rayon::prelude::*;

    (0..rows).into_par_iter().map(row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{Distance, FnMetric};
    use rstest::{fixture, rstest};

    #[fixture]
    fn data() -> FeatureMatrix {
        FeatureMatrix::try_from_rows(&[[0.0, 0.0], [3.0, 4.0], [6.0, 8.0]]).expect("valid rows")
    }

    fn registry_with_failing_plugin() -> MetricRegistry {
        let mut registry = MetricRegistry::with_builtins();
        registry.register(Arc::new(FnMetric::new("broken", |_: &[f32], _: &[f32]| {
            Err(DistanceError::Plugin {
                metric: "broken".to_owned(),
                reason: "unavailable".to_owned(),
            })
        })));
        registry.register(Arc::new(FnMetric::new("negative", |_: &[f32], _: &[f32]| {
            Ok(Distance::new(-1.0))
        })));
        registry
    }

    #[rstest]
    fn pairwise_is_symmetric_with_zero_diagonal(data: FeatureMatrix) {
        let chain = MetricChain::resolve(&MetricRegistry::with_builtins(), "euclidean", None);
        let outcome = chain.pairwise(&data).expect("euclidean succeeds");
        let matrix = outcome.matrix;
        assert_eq!((matrix.rows(), matrix.cols()), (3, 3));
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(0.0));
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.get(0, 2), Some(10.0));
    }

    #[rstest]
    #[case("broken", Some("cityblock"), "cityblock")]
    #[case("negative", Some("broken"), "euclidean")]
    #[case("unknown", None, "euclidean")]
    fn failing_tiers_fall_through(
        data: FeatureMatrix,
        #[case] primary: &str,
        #[case] fallback: Option<&str>,
        #[case] expected: &str,
    ) {
        let chain = MetricChain::resolve(&registry_with_failing_plugin(), primary, fallback);
        let outcome = chain.pairwise(&data).expect("a tier succeeds");
        assert_eq!(outcome.metric, expected);
    }

    #[test]
    fn exhausted_chain_reports_every_attempt() {
        let overflow = FeatureMatrix::try_from_rows(&[[f32::MAX, f32::MAX], [-f32::MAX, -f32::MAX]])
            .expect("finite rows");
        let chain = MetricChain::resolve(&registry_with_failing_plugin(), "broken", Some("negative"));
        let err = chain.pairwise(&overflow).expect_err("every tier fails");

        let names: Vec<_> = err.attempts().iter().map(|a| a.metric.as_str()).collect();
        assert_eq!(names, ["broken", "negative", "euclidean"]);
        assert!(matches!(
            err.attempts()[2].error,
            DistanceError::InvalidOutput { .. }
        ));
        assert_eq!(err.code(), MetricChainErrorCode::Exhausted);
    }

    #[rstest]
    fn cross_has_one_row_per_query(data: FeatureMatrix) {
        let queries = FeatureMatrix::try_from_rows(&[[0.0, 0.0]]).expect("valid rows");
        let chain = MetricChain::resolve(&MetricRegistry::with_builtins(), "chebyshev", None);
        let outcome = chain.cross(&queries, &data).expect("chebyshev succeeds");
        assert_eq!(outcome.matrix.as_slice(), &[0.0, 4.0, 8.0]);
    }
}
