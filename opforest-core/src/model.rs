//! Immutable trained-model state and its invariants.

use thiserror::Error;

use crate::{
    error::{OpfError, define_error_codes},
    forest::PathForest,
    labels::LabelUniverse,
    matrix::FeatureMatrix,
};

/// Metric names the model was trained with. The Euclidean tier is implicit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetricSelection {
    /// Name of the primary metric.
    pub primary: String,
    /// Name of the optional fallback metric.
    pub fallback: Option<String>,
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self {
            primary: "euclidean".to_owned(),
            fallback: None,
        }
    }
}

/// Reasons a set of model parts cannot form a [`TrainedModel`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    /// A per-node column had the wrong length.
    #[error("column `{column}` has {actual} entries but the model has {expected} samples")]
    LengthMismatch {
        /// Column name.
        column: &'static str,
        /// Number of training samples.
        expected: usize,
        /// Entries in the column.
        actual: usize,
    },
    /// No prototypes were recorded.
    #[error("model has no prototypes")]
    NoPrototypes,
    /// Prototype indices were not strictly ascending and in range.
    #[error("prototype {prototype} is out of order, duplicated, or out of range")]
    InvalidPrototype {
        /// The offending index.
        prototype: usize,
    },
    /// A prototype was not a zero-cost self-parented root.
    #[error("prototype {prototype} must be its own parent at cost zero")]
    PrototypeNotRoot {
        /// The offending prototype.
        prototype: usize,
    },
    /// A prototype's assigned label differed from its true label.
    #[error("prototype {prototype} is assigned {assigned} but labelled {label}")]
    PrototypeLabelMismatch {
        /// The offending prototype.
        prototype: usize,
        /// Propagated label.
        assigned: i64,
        /// True label.
        label: i64,
    },
    /// A node other than a prototype was its own parent.
    #[error("node {node} is self-parented but not a prototype")]
    StrayRoot {
        /// The offending node.
        node: usize,
    },
    /// A parent index was out of range.
    #[error("node {node} has out-of-range parent {parent}")]
    ParentOutOfRange {
        /// The offending node.
        node: usize,
        /// Its parent.
        parent: usize,
    },
    /// A cost was NaN, infinite or negative.
    #[error("node {node} has invalid cost {cost}")]
    InvalidCost {
        /// The offending node.
        node: usize,
        /// Its cost.
        cost: f32,
    },
    /// A node was cheaper than its parent.
    #[error("node {node} costs less than its parent {parent}")]
    CostDecreases {
        /// The offending node.
        node: usize,
        /// Its parent.
        parent: usize,
    },
    /// A node's assigned label differed from its parent's.
    #[error("node {node} does not carry the label of its parent {parent}")]
    LabelNotPropagated {
        /// The offending node.
        node: usize,
        /// Its parent.
        parent: usize,
    },
    /// An assigned label was not a training label.
    #[error("node {node} is assigned label {label} which no training sample carries")]
    UnknownAssignedLabel {
        /// The offending node.
        node: usize,
        /// The assigned label.
        label: i64,
    },
    /// The parent chain from a node did not reach a prototype.
    #[error("parent chain from node {node} does not reach a prototype")]
    Cycle {
        /// The node whose chain loops.
        node: usize,
    },
    /// The recorded sentinel is unusable.
    #[error("unknown-label sentinel is invalid: {reason}")]
    InvalidSentinel {
        /// Why it was rejected.
        reason: String,
    },
    /// A recorded metric name was blank.
    #[error("recorded metric name must not be empty")]
    EmptyMetricName,
}

define_error_codes! {
    /// Machine-readable error codes for [`ModelError`].
    enum ModelErrorCode for ModelError {
        /// A per-node column had the wrong length.
        LengthMismatch => LengthMismatch { .. } => "MODEL_LENGTH_MISMATCH",
        /// No prototypes were recorded.
        NoPrototypes => NoPrototypes => "MODEL_NO_PROTOTYPES",
        /// Prototype indices were malformed.
        InvalidPrototype => InvalidPrototype { .. } => "MODEL_INVALID_PROTOTYPE",
        /// A prototype was not a root.
        PrototypeNotRoot => PrototypeNotRoot { .. } => "MODEL_PROTOTYPE_NOT_ROOT",
        /// A prototype's labels disagreed.
        PrototypeLabelMismatch => PrototypeLabelMismatch { .. } => "MODEL_PROTOTYPE_LABEL_MISMATCH",
        /// A non-prototype was self-parented.
        StrayRoot => StrayRoot { .. } => "MODEL_STRAY_ROOT",
        /// A parent index was out of range.
        ParentOutOfRange => ParentOutOfRange { .. } => "MODEL_PARENT_OUT_OF_RANGE",
        /// A cost was unusable.
        InvalidCost => InvalidCost { .. } => "MODEL_INVALID_COST",
        /// A node was cheaper than its parent.
        CostDecreases => CostDecreases { .. } => "MODEL_COST_DECREASES",
        /// A label did not propagate.
        LabelNotPropagated => LabelNotPropagated { .. } => "MODEL_LABEL_NOT_PROPAGATED",
        /// An assigned label was not a training label.
        UnknownAssignedLabel => UnknownAssignedLabel { .. } => "MODEL_UNKNOWN_ASSIGNED_LABEL",
        /// A parent chain looped.
        Cycle => Cycle { .. } => "MODEL_CYCLE",
        /// The sentinel was unusable.
        InvalidSentinel => InvalidSentinel { .. } => "MODEL_INVALID_SENTINEL",
        /// A metric name was blank.
        EmptyMetricName => EmptyMetricName => "MODEL_EMPTY_METRIC_NAME",
    }
}

/// Raw columns of a trained model, as produced by persistence layers.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelParts {
    /// Training feature vectors.
    pub features: FeatureMatrix,
    /// True training labels.
    pub labels: Vec<i64>,
    /// Labels propagated by the forest.
    pub assigned: Vec<i64>,
    /// Bottleneck path costs.
    pub cost: Vec<f32>,
    /// Optimum-path parents.
    pub parent: Vec<usize>,
    /// Prototype indices in ascending order.
    pub prototypes: Vec<usize>,
    /// The reserved unknown label.
    pub unknown_label: i64,
    /// Margin the sentinel was derived with.
    pub sentinel_margin: i64,
    /// Metric chain configuration.
    pub metric: MetricSelection,
}

/// Everything `classify` needs: training features, forest arrays, label
/// universe and metric configuration.
///
/// A model never changes after construction, so it can be read from any
/// number of threads at once.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainedModel {
    features: FeatureMatrix,
    labels: Vec<i64>,
    forest: PathForest,
    universe: LabelUniverse,
    metric: MetricSelection,
}

impl TrainedModel {
    pub(crate) fn new(
        features: FeatureMatrix,
        labels: Vec<i64>,
        forest: PathForest,
        universe: LabelUniverse,
        metric: MetricSelection,
    ) -> Self {
        Self {
            features,
            labels,
            forest,
            universe,
            metric,
        }
    }

    /// Validates persisted parts and assembles a model.
    ///
    /// # Errors
    /// Returns [`OpfError::InvalidModel`] when any model invariant fails:
    /// column lengths, prototype roots, parent ranges, acyclic parent chains,
    /// non-decreasing costs, label propagation, or sentinel placement.
    pub fn from_parts(parts: ModelParts) -> Result<Self, OpfError> {
        validate_parts(&parts)?;
        let ModelParts {
            features,
            labels,
            assigned,
            cost,
            parent,
            prototypes,
            unknown_label,
            sentinel_margin,
            metric,
        } = parts;
        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let universe =
            LabelUniverse::from_parts(distinct, unknown_label, sentinel_margin).map_err(|_| {
                ModelError::InvalidSentinel {
                    reason: format!("{unknown_label} is a training label"),
                }
            })?;
        let forest = PathForest::from_validated(cost, parent, assigned, prototypes);
        Ok(Self::new(features, labels, forest, universe, metric))
    }

    /// Training feature vectors.
    #[must_use]
    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    /// True training labels.
    #[must_use]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Labels propagated by the forest.
    #[must_use]
    pub fn assigned(&self) -> &[i64] {
        self.forest.label()
    }

    /// Bottleneck path costs.
    #[must_use]
    pub fn cost(&self) -> &[f32] {
        self.forest.cost()
    }

    /// Optimum-path parents.
    #[must_use]
    pub fn parent(&self) -> &[usize] {
        self.forest.parent()
    }

    /// Prototype indices in ascending order.
    #[must_use]
    pub fn prototypes(&self) -> &[usize] {
        self.forest.prototypes()
    }

    /// The underlying forest.
    #[must_use]
    pub fn forest(&self) -> &PathForest {
        &self.forest
    }

    /// Distinct labels and the unknown sentinel.
    #[must_use]
    pub fn universe(&self) -> &LabelUniverse {
        &self.universe
    }

    /// Metric chain configuration used for training.
    #[must_use]
    pub fn metric(&self) -> &MetricSelection {
        &self.metric
    }

    /// Number of training samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false`; models hold at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Dimensionality of training vectors.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.features.dimension()
    }
}

fn validate_parts(parts: &ModelParts) -> Result<(), ModelError> {
    let n = parts.features.rows();
    for (column, actual) in [
        ("label", parts.labels.len()),
        ("assigned", parts.assigned.len()),
        ("cost", parts.cost.len()),
        ("parent", parts.parent.len()),
    ] {
        if actual != n {
            return Err(ModelError::LengthMismatch {
                column,
                expected: n,
                actual,
            });
        }
    }
    if parts.metric.primary.trim().is_empty()
        || parts
            .metric
            .fallback
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
    {
        return Err(ModelError::EmptyMetricName);
    }
    if parts.sentinel_margin < 1 {
        return Err(ModelError::InvalidSentinel {
            reason: format!("margin {} is below 1", parts.sentinel_margin),
        });
    }

    let is_prototype = validate_prototypes(parts, n)?;
    validate_nodes(parts, &is_prototype)
}

fn validate_prototypes(parts: &ModelParts, n: usize) -> Result<Vec<bool>, ModelError> {
    if parts.prototypes.is_empty() {
        return Err(ModelError::NoPrototypes);
    }
    let mut is_prototype = vec![false; n];
    let mut previous: Option<usize> = None;
    for &prototype in &parts.prototypes {
        if prototype >= n || previous.is_some_and(|p| p >= prototype) {
            return Err(ModelError::InvalidPrototype { prototype });
        }
        previous = Some(prototype);
        is_prototype[prototype] = true;
        if parts.parent[prototype] != prototype || parts.cost[prototype] != 0.0 {
            return Err(ModelError::PrototypeNotRoot { prototype });
        }
        if parts.assigned[prototype] != parts.labels[prototype] {
            return Err(ModelError::PrototypeLabelMismatch {
                prototype,
                assigned: parts.assigned[prototype],
                label: parts.labels[prototype],
            });
        }
    }
    Ok(is_prototype)
}

fn validate_nodes(parts: &ModelParts, is_prototype: &[bool]) -> Result<(), ModelError> {
    let n = is_prototype.len();
    let mut known = parts.labels.clone();
    known.sort_unstable();
    known.dedup();

    for node in 0..n {
        let parent = parts.parent[node];
        let cost = parts.cost[node];
        if parent >= n {
            return Err(ModelError::ParentOutOfRange { node, parent });
        }
        if parent == node && !is_prototype[node] {
            return Err(ModelError::StrayRoot { node });
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(ModelError::InvalidCost { node, cost });
        }
        if cost < parts.cost[parent] {
            return Err(ModelError::CostDecreases { node, parent });
        }
        if parts.assigned[node] != parts.assigned[parent] {
            return Err(ModelError::LabelNotPropagated { node, parent });
        }
        if known.binary_search(&parts.assigned[node]).is_err() {
            return Err(ModelError::UnknownAssignedLabel {
                node,
                label: parts.assigned[node],
            });
        }
    }

    // A walk longer than n steps without reaching a root loops.
    for start in 0..n {
        let mut current = start;
        let mut steps = 0;
        while parts.parent[current] != current {
            current = parts.parent[current];
            steps += 1;
            if steps > n {
                return Err(ModelError::Cycle { node: start });
            }
        }
    }
    Ok(())
}
