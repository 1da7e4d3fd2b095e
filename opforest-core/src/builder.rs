//! Builder utilities for configuring [`OpfClassifier`] instances.
//!
//! Collects the metric chain, plugin metrics and sentinel margin, and
//! validates them before an untrained classifier is constructed.

use std::sync::Arc;

use crate::{
    Result,
    classifier::OpfClassifier,
    distance::{DistanceMetric, MetricRegistry},
    error::OpfError,
    labels::DEFAULT_SENTINEL_MARGIN,
    model::{MetricSelection, TrainedModel},
};

/// Configures and constructs [`OpfClassifier`] instances.
///
/// # Examples
/// ```
/// use opforest_core::OpfBuilder;
///
/// let classifier = OpfBuilder::new()
///     .with_metric("cityblock")
///     .with_fallback_metric("cosine")
///     .build()
///     .expect("builder configuration is valid");
/// assert!(!classifier.is_trained());
/// assert_eq!(classifier.metric_selection().primary, "cityblock");
/// ```
#[derive(Debug, Clone)]
pub struct OpfBuilder {
    metric: MetricSelection,
    registry: MetricRegistry,
    sentinel_margin: i64,
}

impl Default for OpfBuilder {
    fn default() -> Self {
        Self {
            metric: MetricSelection::default(),
            registry: MetricRegistry::with_builtins(),
            sentinel_margin: DEFAULT_SENTINEL_MARGIN,
        }
    }
}

impl OpfBuilder {
    /// Creates a builder with the Euclidean metric, no fallback, and the
    /// default sentinel margin.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::OpfBuilder;
    ///
    /// let builder = OpfBuilder::new();
    /// assert_eq!(builder.metric(), "euclidean");
    /// assert_eq!(builder.fallback_metric(), None);
    /// assert_eq!(builder.sentinel_margin(), 999);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary metric by name.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>) -> Self {
        self.metric.primary = name.into();
        self
    }

    /// Returns the configured primary metric name.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric.primary
    }

    /// Sets the metric tried when the primary metric fails.
    #[must_use]
    pub fn with_fallback_metric(mut self, name: impl Into<String>) -> Self {
        self.metric.fallback = Some(name.into());
        self
    }

    /// Returns the configured fallback metric name.
    #[must_use]
    pub fn fallback_metric(&self) -> Option<&str> {
        self.metric.fallback.as_deref()
    }

    /// Registers a plugin metric under its own name, replacing any metric
    /// already registered under that name.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::{Distance, FnMetric, OpfBuilder};
    ///
    /// let classifier = OpfBuilder::new()
    ///     .with_metric_plugin(FnMetric::new("first-axis", |l: &[f32], r: &[f32]| {
    ///         Ok(Distance::new((l[0] - r[0]).abs()))
    ///     }))
    ///     .with_metric("first-axis")
    ///     .build()?;
    /// assert_eq!(classifier.metric_selection().primary, "first-axis");
    /// # Ok::<(), opforest_core::OpfError>(())
    /// ```
    #[must_use]
    pub fn with_metric_plugin<M>(mut self, metric: M) -> Self
    where
        M: DistanceMetric + 'static,
    {
        self.registry.register(Arc::new(metric));
        self
    }

    /// Returns the registry that will resolve metric names.
    #[must_use]
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Sets how far below the smallest training label the unknown-label
    /// sentinel is placed.
    #[must_use]
    pub fn with_sentinel_margin(mut self, margin: i64) -> Self {
        self.sentinel_margin = margin;
        self
    }

    /// Returns the configured sentinel margin.
    #[must_use]
    pub fn sentinel_margin(&self) -> i64 {
        self.sentinel_margin
    }

    /// Validates the configuration and constructs an untrained classifier.
    ///
    /// # Errors
    /// Returns [`OpfError::InvalidSentinelMargin`] when the margin is below
    /// one and [`OpfError::EmptyMetricName`] when a metric name is blank.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::{OpfBuilder, OpfError};
    ///
    /// let err = OpfBuilder::new().with_sentinel_margin(0).build().unwrap_err();
    /// assert_eq!(err, OpfError::InvalidSentinelMargin { got: 0 });
    /// ```
    pub fn build(self) -> Result<OpfClassifier> {
        self.validate()?;
        Ok(OpfClassifier::new(
            self.registry,
            self.metric,
            self.sentinel_margin,
            None,
        ))
    }

    /// The model's metric selection and sentinel margin replace the builder's;
    /// only the plugin registry carries over.
    pub(crate) fn build_trained(self, model: TrainedModel) -> Result<OpfClassifier> {
        let builder = Self {
            metric: model.metric().clone(),
            sentinel_margin: model.universe().margin(),
            registry: self.registry,
        };
        builder.validate()?;
        Ok(OpfClassifier::new(
            builder.registry,
            builder.metric,
            builder.sentinel_margin,
            Some(model),
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.sentinel_margin < 1 {
            return Err(OpfError::InvalidSentinelMargin {
                got: self.sentinel_margin,
            });
        }
        if self.metric.primary.trim().is_empty() {
            return Err(OpfError::EmptyMetricName { tier: "primary" });
        }
        if self
            .metric
            .fallback
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(OpfError::EmptyMetricName { tier: "fallback" });
        }
        Ok(())
    }
}
