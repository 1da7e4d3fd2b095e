//! Training and classification driver for the optimum-path forest.
//!
//! `fit` turns labelled feature vectors into a [`TrainedModel`]: distances
//! through the metric fallback chain, a dense Prim spanning tree, boundary
//! prototypes, then max-path forest growth. `classify` scores every test
//! vector against every training node and picks the cheapest bottleneck.

use tracing::{info, instrument};

use crate::{
    Result,
    builder::OpfBuilder,
    distance::{DistanceMatrix, MetricChain, MetricRegistry},
    error::{DataError, MatrixRole, OpfError},
    forest::grow_forest,
    labels::LabelUniverse,
    matrix::FeatureMatrix,
    model::{MetricSelection, TrainedModel},
    mst::prim_mst,
    prototype::select_prototypes,
};

/// Outcome of classifying one test vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    /// Label of the winning training node.
    pub label: i64,
    /// Effective bottleneck cost `max(distance, cost[node])` of the winner.
    pub cost: f32,
    /// Index of the winning training node.
    pub node: usize,
}

/// An optimum-path forest classifier.
///
/// Created untrained by [`OpfBuilder::build`]; [`OpfClassifier::fit`] moves
/// it to the trained state exactly once.
///
/// # Concurrency
///
/// Every query method takes `&self` and reads the trained model without
/// mutating it, so a trained classifier is `Sync` and may be shared across
/// threads (for example behind an `Arc`) without any locking.
///
/// # Examples
/// ```
/// use opforest_core::OpfBuilder;
///
/// let mut classifier = OpfBuilder::new().build()?;
/// classifier.fit(&[[0.0], [10.0]], &[1, 2])?;
/// assert_eq!(classifier.classify(&[[0.1], [9.9], [5.0]])?, vec![1, 2, 1]);
/// # Ok::<(), opforest_core::OpfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct OpfClassifier {
    registry: MetricRegistry,
    selection: MetricSelection,
    chain: MetricChain,
    sentinel_margin: i64,
    model: Option<TrainedModel>,
}

impl OpfClassifier {
    pub(crate) fn new(
        registry: MetricRegistry,
        selection: MetricSelection,
        sentinel_margin: i64,
        model: Option<TrainedModel>,
    ) -> Self {
        let chain = MetricChain::resolve(
            &registry,
            &selection.primary,
            selection.fallback.as_deref(),
        );
        Self {
            registry,
            selection,
            chain,
            sentinel_margin,
            model,
        }
    }

    /// Rebuilds a trained classifier from a persisted model.
    ///
    /// The model's metric selection and sentinel margin are used; `builder`
    /// supplies the plugin metrics needed to resolve the recorded names.
    ///
    /// # Errors
    /// Returns [`OpfError::EmptyMetricName`] when the model records a blank
    /// metric name.
    pub fn from_model(builder: OpfBuilder, model: TrainedModel) -> Result<Self> {
        builder.build_trained(model)
    }

    /// Returns `true` once a model is held.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Returns the trained model, if any.
    #[must_use]
    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    /// Consumes the classifier and returns its model, if any.
    #[must_use]
    pub fn into_model(self) -> Option<TrainedModel> {
        self.model
    }

    /// The configured metric names.
    #[must_use]
    pub fn metric_selection(&self) -> &MetricSelection {
        &self.selection
    }

    /// The resolved metric chain.
    #[must_use]
    pub fn metric_chain(&self) -> &MetricChain {
        &self.chain
    }

    /// The registry metric names are resolved against.
    #[must_use]
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// The configured sentinel margin.
    #[must_use]
    pub fn sentinel_margin(&self) -> i64 {
        self.sentinel_margin
    }

    /// The reserved unknown label, available once trained.
    ///
    /// Callers applying a rejection threshold to [`Prediction::cost`] can
    /// substitute this value for rejected samples.
    #[must_use]
    pub fn unknown_label(&self) -> Option<i64> {
        self.model.as_ref().map(|model| model.universe().unknown())
    }

    /// Trains on nested feature rows and their labels.
    ///
    /// # Errors
    /// - [`OpfError::AlreadyTrained`] when a model is already held.
    /// - [`OpfError::EmptyTrainingSet`] for zero samples.
    /// - [`OpfError::LabelCountMismatch`] when lengths differ.
    /// - [`OpfError::InvalidFeatures`] for ragged or non-finite rows.
    /// - Any error from [`OpfClassifier::fit_matrix`].
    ///
    /// On error the classifier stays untrained.
    pub fn fit<R: AsRef<[f32]>>(&mut self, features: &[R], labels: &[i64]) -> Result<()> {
        if self.model.is_some() {
            return Err(OpfError::AlreadyTrained);
        }
        if features.is_empty() {
            return Err(OpfError::EmptyTrainingSet);
        }
        if features.len() != labels.len() {
            return Err(OpfError::LabelCountMismatch {
                samples: features.len(),
                labels: labels.len(),
            });
        }
        let matrix =
            FeatureMatrix::try_from_rows(features).map_err(|error| OpfError::InvalidFeatures {
                role: MatrixRole::Training,
                error,
            })?;
        self.fit_matrix(matrix, labels)
    }

    /// Trains on a validated feature matrix.
    ///
    /// # Errors
    /// - [`OpfError::AlreadyTrained`] when a model is already held.
    /// - [`OpfError::LabelCountMismatch`] when lengths differ.
    /// - [`OpfError::SentinelOverflow`] when the sentinel cannot be placed.
    /// - [`OpfError::Metric`] when every metric tier fails.
    /// - [`OpfError::LabelCollision`], [`OpfError::Mst`],
    ///   [`OpfError::Prototype`] or [`OpfError::Forest`] on internal
    ///   invariant violations.
    #[instrument(
        name = "opf.fit",
        err,
        skip(self, features, labels),
        fields(
            samples = features.rows(),
            dimension = features.dimension(),
            metric = %self.selection.primary,
        ),
    )]
    pub fn fit_matrix(&mut self, features: FeatureMatrix, labels: &[i64]) -> Result<()> {
        if self.model.is_some() {
            return Err(OpfError::AlreadyTrained);
        }
        if features.rows() != labels.len() {
            return Err(OpfError::LabelCountMismatch {
                samples: features.rows(),
                labels: labels.len(),
            });
        }

        let universe = LabelUniverse::from_labels(labels, self.sentinel_margin)?;
        let outcome = self.chain.pairwise(&features)?;
        let tree = prim_mst(&outcome.matrix)?;
        let prototypes = select_prototypes(&tree, labels)?;
        let prototype_labels: Vec<i64> = prototypes
            .iter()
            .filter_map(|&node| labels.get(node).copied())
            .collect();
        let forest = grow_forest(&outcome.matrix, &prototypes, &prototype_labels)?;
        if forest.label().contains(&universe.unknown()) {
            return Err(OpfError::LabelCollision {
                sentinel: universe.unknown(),
            });
        }

        info!(
            prototypes = forest.prototypes().len(),
            classes = universe.class_count(),
            metric = %outcome.metric,
            "opf training completed"
        );
        self.model = Some(TrainedModel::new(
            features,
            labels.to_vec(),
            forest,
            universe,
            self.selection.clone(),
        ));
        Ok(())
    }

    /// Predicts a label for every test row.
    ///
    /// # Errors
    /// Same as [`OpfClassifier::classify_with_costs`].
    pub fn classify<R: AsRef<[f32]>>(&self, test_features: &[R]) -> Result<Vec<i64>> {
        Ok(self
            .classify_with_costs(test_features)?
            .into_iter()
            .map(|prediction| prediction.label)
            .collect())
    }

    /// Predicts a label, bottleneck cost and winning node for every test row.
    ///
    /// An empty input yields an empty result.
    ///
    /// # Errors
    /// - [`OpfError::NotTrained`] before `fit`.
    /// - [`OpfError::InvalidFeatures`] for ragged or non-finite rows.
    /// - [`OpfError::DimensionMismatch`] when rows differ from the training
    ///   dimensionality.
    /// - [`OpfError::Metric`] when every metric tier fails.
    pub fn classify_with_costs<R: AsRef<[f32]>>(
        &self,
        test_features: &[R],
    ) -> Result<Vec<Prediction>> {
        if self.model.is_none() {
            return Err(OpfError::NotTrained);
        }
        if test_features.is_empty() {
            return Ok(Vec::new());
        }
        let matrix = FeatureMatrix::try_from_rows(test_features).map_err(|error| {
            OpfError::InvalidFeatures {
                role: MatrixRole::Test,
                error,
            }
        })?;
        self.classify_matrix(&matrix)
    }

    /// Classifies a single vector.
    ///
    /// # Errors
    /// Same as [`OpfClassifier::classify_with_costs`].
    ///
    /// # Examples
    /// ```
    /// use opforest_core::OpfBuilder;
    ///
    /// let mut classifier = OpfBuilder::new().build()?;
    /// classifier.fit(&[[0.0], [10.0]], &[1, 2])?;
    /// let prediction = classifier.predict_one(&[9.0])?;
    /// assert_eq!((prediction.label, prediction.node), (2, 1));
    /// assert_eq!(prediction.cost, 1.0);
    /// # Ok::<(), opforest_core::OpfError>(())
    /// ```
    pub fn predict_one(&self, sample: &[f32]) -> Result<Prediction> {
        let mut predictions = self.classify_with_costs(&[sample])?;
        predictions.pop().ok_or(OpfError::InvalidFeatures {
            role: MatrixRole::Test,
            error: DataError::EmptyData,
        })
    }

    /// Classifies every row of a validated matrix.
    ///
    /// # Errors
    /// Returns [`OpfError::NotTrained`], [`OpfError::DimensionMismatch`] or
    /// [`OpfError::Metric`].
    #[instrument(
        name = "opf.classify",
        err,
        skip(self, test_features),
        fields(samples = test_features.rows(), dimension = test_features.dimension()),
    )]
    pub fn classify_matrix(&self, test_features: &FeatureMatrix) -> Result<Vec<Prediction>> {
        let model = self.model.as_ref().ok_or(OpfError::NotTrained)?;
        if test_features.dimension() != model.dimension() {
            return Err(OpfError::DimensionMismatch {
                expected: model.dimension(),
                actual: test_features.dimension(),
            });
        }
        let outcome = self.chain.cross(test_features, model.features())?;
        Ok(best_matches(&outcome.matrix, model))
    }
}

fn best_matches(distances: &DistanceMatrix, model: &TrainedModel) -> Vec<Prediction> {
    distances
        .iter_rows()
        .take(distances.rows())
        .filter_map(|row| best_match(row, model.cost(), model.assigned()))
        .collect()
}

/// Lowest-index argmin of `max(distance[i], cost[i])`.
fn best_match(distances: &[f32], cost: &[f32], assigned: &[i64]) -> Option<Prediction> {
    let mut best: Option<Prediction> = None;
    for (node, ((&distance, &path_cost), &label)) in
        distances.iter().zip(cost).zip(assigned).enumerate()
    {
        let effective = distance.max(path_cost);
        if best.is_none_or(|current| effective < current.cost) {
            best = Some(Prediction {
                label,
                cost: effective,
                node,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn classifier_is_shareable_across_threads() {
        assert_send_sync::<OpfClassifier>();
        assert_send_sync::<TrainedModel>();
    }

    #[test]
    fn best_match_prefers_lowest_index_on_ties() {
        let prediction = best_match(&[5.0, 5.0], &[0.0, 0.0], &[1, 2]).expect("non-empty");
        assert_eq!(
            prediction,
            Prediction {
                label: 1,
                cost: 5.0,
                node: 0
            }
        );
    }

    #[test]
    fn best_match_uses_path_cost_as_floor() {
        // Node 1 is closer but its path cost dominates.
        let prediction = best_match(&[3.0, 1.0], &[0.0, 4.0], &[1, 2]).expect("non-empty");
        assert_eq!((prediction.label, prediction.cost), (1, 3.0));
    }
}
