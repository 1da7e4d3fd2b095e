//! The [`DistanceMetric`] capability, the built-in metrics, and the
//! per-classifier registry that resolves metric names.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use super::cosine::cosine_distance;
use super::elementwise::{
    braycurtis_distance, canberra_distance, chebyshev_distance, cityblock_distance,
};
use super::euclidean::{euclidean_distance, squared_euclidean_distance};
use super::types::{Distance, DistanceError, Result};

/// A symmetric dissimilarity function over feature vectors.
///
/// Implementations must be thread-safe so a trained classifier can be queried
/// concurrently.
///
/// # Examples
/// ```
/// use opforest_core::{Distance, DistanceError, DistanceMetric};
///
/// #[derive(Debug)]
/// struct Hamming;
///
/// impl DistanceMetric for Hamming {
///     fn name(&self) -> &str { "hamming" }
///     fn distance(&self, left: &[f32], right: &[f32]) -> Result<Distance, DistanceError> {
///         if left.len() != right.len() {
///             return Err(DistanceError::DimensionMismatch { left: left.len(), right: right.len() });
///         }
///         let differing = left.iter().zip(right).filter(|(l, r)| l != r).count();
///         Ok(Distance::new(differing as f32))
///     }
/// }
///
/// assert_eq!(Hamming.distance(&[1.0, 2.0], &[1.0, 3.0])?.value(), 1.0);
/// # Ok::<(), DistanceError>(())
/// ```
pub trait DistanceMetric: fmt::Debug + Send + Sync {
    /// Returns the name the metric is registered under.
    fn name(&self) -> &str;

    /// Computes the distance between two vectors.
    ///
    /// # Errors
    /// Returns a [`DistanceError`] when the inputs are invalid for the metric.
    fn distance(&self, left: &[f32], right: &[f32]) -> Result<Distance>;
}

/// Metrics shipped with the crate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BuiltinMetric {
    /// Straight-line (L2) distance.
    Euclidean,
    /// Squared L2 distance.
    SquaredEuclidean,
    /// Manhattan (L1) distance.
    Cityblock,
    /// Maximum coordinate difference (L∞).
    Chebyshev,
    /// One minus cosine similarity.
    Cosine,
    /// Canberra distance.
    Canberra,
    /// Bray–Curtis dissimilarity.
    BrayCurtis,
}

impl BuiltinMetric {
    /// Every built-in metric in registration order.
    pub const ALL: [Self; 7] = [
        Self::Euclidean,
        Self::SquaredEuclidean,
        Self::Cityblock,
        Self::Chebyshev,
        Self::Cosine,
        Self::Canberra,
        Self::BrayCurtis,
    ];

    /// Returns the canonical name of the metric.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SquaredEuclidean => "sqeuclidean",
            Self::Cityblock => "cityblock",
            Self::Chebyshev => "chebyshev",
            Self::Cosine => "cosine",
            Self::Canberra => "canberra",
            Self::BrayCurtis => "braycurtis",
        }
    }

    /// Resolves a canonical name or alias, ignoring case and surrounding
    /// whitespace.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::BuiltinMetric;
    ///
    /// assert_eq!(BuiltinMetric::parse("Manhattan"), Some(BuiltinMetric::Cityblock));
    /// assert_eq!(BuiltinMetric::parse("l2"), Some(BuiltinMetric::Euclidean));
    /// assert_eq!(BuiltinMetric::parse("jaccard"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Some(Self::Euclidean),
            "sqeuclidean" | "squared_euclidean" => Some(Self::SquaredEuclidean),
            "cityblock" | "manhattan" | "l1" => Some(Self::Cityblock),
            "chebyshev" | "linf" => Some(Self::Chebyshev),
            "cosine" => Some(Self::Cosine),
            "canberra" => Some(Self::Canberra),
            "braycurtis" | "bray_curtis" => Some(Self::BrayCurtis),
            _ => None,
        }
    }
}

impl fmt::Display for BuiltinMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinMetric {
    type Err = DistanceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| DistanceError::UnknownMetric { name: s.to_owned() })
    }
}

impl DistanceMetric for BuiltinMetric {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> Result<Distance> {
        match self {
            Self::Euclidean => euclidean_distance(left, right),
            Self::SquaredEuclidean => squared_euclidean_distance(left, right),
            Self::Cityblock => cityblock_distance(left, right),
            Self::Chebyshev => chebyshev_distance(left, right),
            Self::Cosine => cosine_distance(left, right),
            Self::Canberra => canberra_distance(left, right),
            Self::BrayCurtis => braycurtis_distance(left, right),
        }
    }
}

/// Adapts a closure into a named [`DistanceMetric`] plugin.
///
/// # Examples
/// ```
/// use opforest_core::{Distance, DistanceMetric, FnMetric};
///
/// let absolute = FnMetric::new("absolute", |left: &[f32], right: &[f32]| {
///     Ok(Distance::new((left[0] - right[0]).abs()))
/// });
/// assert_eq!(absolute.name(), "absolute");
/// assert_eq!(absolute.distance(&[1.0], &[4.0])?.value(), 3.0);
/// # Ok::<(), opforest_core::DistanceError>(())
/// ```
pub struct FnMetric<F> {
    name: String,
    function: F,
}

impl<F> FnMetric<F>
where
    F: Fn(&[f32], &[f32]) -> Result<Distance> + Send + Sync,
{
    /// Wraps `function` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, function: F) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

impl<F> fmt::Debug for FnMetric<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMetric")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> DistanceMetric for FnMetric<F>
where
    F: Fn(&[f32], &[f32]) -> Result<Distance> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> Result<Distance> {
        (self.function)(left, right)
    }
}

/// Name-to-metric lookup owned by a single classifier configuration.
///
/// Names are matched case-insensitively. Registering a metric under an
/// existing name replaces the previous entry.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use opforest_core::{BuiltinMetric, MetricRegistry};
///
/// let mut registry = MetricRegistry::with_builtins();
/// assert!(registry.resolve("manhattan").is_some());
/// assert!(registry.resolve("plugin").is_none());
///
/// registry.register(Arc::new(BuiltinMetric::Chebyshev));
/// assert_eq!(registry.names().count(), BuiltinMetric::ALL.len());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MetricRegistry {
    metrics: BTreeMap<String, Arc<dyn DistanceMetric>>,
}

impl MetricRegistry {
    /// Creates a registry pre-populated with every [`BuiltinMetric`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        for metric in BuiltinMetric::ALL {
            registry.register(Arc::new(metric));
        }
        registry
    }

    /// Registers `metric` under its own name.
    pub fn register(&mut self, metric: Arc<dyn DistanceMetric>) {
        let key = normalise(metric.name());
        self.metrics.insert(key, metric);
    }

    /// Looks up a metric by name, falling back to built-in aliases.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn DistanceMetric>> {
        if let Some(metric) = self.metrics.get(&normalise(name)) {
            return Some(Arc::clone(metric));
        }
        let builtin = BuiltinMetric::parse(name)?;
        self.metrics.get(builtin.as_str()).map(Arc::clone)
    }

    /// Iterates over the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }
}

fn normalise(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
