//! Optimum-path forest growth by multi-source max-path Dijkstra.
//!
//! Every prototype seeds the queue at cost zero. Popping a node settles it;
//! its neighbours are offered the bottleneck cost `max(cost[p], A[p][q])`
//! and adopt the popped node as parent when that strictly improves on their
//! current cost. Path cost is the largest edge along the path, never the sum.

mod queue;

use thiserror::Error;
use tracing::debug;

use crate::{distance::DistanceMatrix, error::define_error_codes};

use self::queue::CostQueue;

/// Errors returned while growing the forest.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ForestError {
    /// The distance matrix was not square.
    #[error("distance matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns supplied.
        cols: usize,
    },
    /// The graph has nodes but no seeds were supplied.
    #[error("at least one prototype is required to grow a forest over {nodes} nodes")]
    NoPrototypes {
        /// Nodes in the graph.
        nodes: usize,
    },
    /// A prototype referenced a node outside the graph.
    #[error("prototype {prototype} is out of range for {nodes} nodes")]
    PrototypeOutOfRange {
        /// The offending index.
        prototype: usize,
        /// Nodes in the graph.
        nodes: usize,
    },
    /// A prototype was listed more than once.
    #[error("prototype {prototype} is listed more than once")]
    DuplicatePrototype {
        /// The repeated index.
        prototype: usize,
    },
    /// Prototype and label slices differed in length.
    #[error("{prototypes} prototypes were supplied with {labels} labels")]
    LabelCountMismatch {
        /// Number of prototypes.
        prototypes: usize,
        /// Number of labels.
        labels: usize,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`ForestError`].
    enum ForestErrorCode for ForestError {
        /// The distance matrix was not square.
        NotSquare => NotSquare { .. } => "FOREST_NOT_SQUARE",
        /// No prototypes were supplied.
        NoPrototypes => NoPrototypes { .. } => "FOREST_NO_PROTOTYPES",
        /// A prototype was out of range.
        PrototypeOutOfRange => PrototypeOutOfRange { .. } => "FOREST_PROTOTYPE_OUT_OF_RANGE",
        /// A prototype was listed more than once.
        DuplicatePrototype => DuplicatePrototype { .. } => "FOREST_DUPLICATE_PROTOTYPE",
        /// Prototype and label slices differed in length.
        LabelCountMismatch => LabelCountMismatch { .. } => "FOREST_LABEL_COUNT_MISMATCH",
    }
}

/// Per-node result of forest growth: bottleneck cost, optimum-path parent and
/// propagated label. Prototypes are their own parent at cost zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PathForest {
    cost: Vec<f32>,
    parent: Vec<usize>,
    label: Vec<i64>,
    prototypes: Vec<usize>,
}

impl PathForest {
    /// Wraps arrays whose invariants the caller has already checked.
    pub(crate) fn from_validated(
        cost: Vec<f32>,
        parent: Vec<usize>,
        label: Vec<i64>,
        prototypes: Vec<usize>,
    ) -> Self {
        Self {
            cost,
            parent,
            label,
            prototypes,
        }
    }

    /// Bottleneck cost of each node's optimum path.
    #[must_use]
    pub fn cost(&self) -> &[f32] {
        &self.cost
    }

    /// Predecessor of each node on its optimum path.
    #[must_use]
    pub fn parent(&self) -> &[usize] {
        &self.parent
    }

    /// Label propagated to each node from its root prototype.
    #[must_use]
    pub fn label(&self) -> &[i64] {
        &self.label
    }

    /// Prototype indices in ascending order.
    #[must_use]
    pub fn prototypes(&self) -> &[usize] {
        &self.prototypes
    }

    /// Number of nodes in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cost.len()
    }

    /// Returns `true` when the forest covers no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cost.is_empty()
    }

    /// Follows parent pointers from `node` to its prototype.
    ///
    /// Returns `None` when `node` is out of range or the walk does not reach
    /// a self-parented node within `len()` steps.
    #[must_use]
    pub fn root_of(&self, node: usize) -> Option<usize> {
        let mut current = node;
        for _ in 0..=self.len() {
            let parent = *self.parent.get(current)?;
            if parent == current {
                return Some(current);
            }
            current = parent;
        }
        None
    }

    /// Splits the forest into `(cost, parent, label, prototypes)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<f32>, Vec<usize>, Vec<i64>, Vec<usize>) {
        (self.cost, self.parent, self.label, self.prototypes)
    }
}

/// Grows the optimum-path forest over the complete graph in `distances`,
/// seeded at `prototypes` with the matching `prototype_labels`.
///
/// # Errors
/// Returns a [`ForestError`] when the matrix is not square, when the
/// prototype list is empty for a non-empty graph, contains duplicates or
/// out-of-range indices, or differs in length from `prototype_labels`.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceMatrix, grow_forest};
///
/// let distances = DistanceMatrix::try_from_rows(&[
///     [0.0, 1.0, 9.0, 9.0],
///     [1.0, 0.0, 3.0, 9.0],
///     [9.0, 3.0, 0.0, 1.0],
///     [9.0, 9.0, 1.0, 0.0],
/// ])?;
/// let forest = grow_forest(&distances, &[1, 2], &[10, 20])?;
/// assert_eq!(forest.label(), &[10, 10, 20, 20]);
/// assert_eq!(forest.parent(), &[1, 1, 2, 2]);
/// assert_eq!(forest.cost(), &[1.0, 0.0, 0.0, 1.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn grow_forest(
    distances: &DistanceMatrix,
    prototypes: &[usize],
    prototype_labels: &[i64],
) -> Result<PathForest, ForestError> {
    if !distances.is_square() {
        return Err(ForestError::NotSquare {
            rows: distances.rows(),
            cols: distances.cols(),
        });
    }
    if prototypes.len() != prototype_labels.len() {
        return Err(ForestError::LabelCountMismatch {
            prototypes: prototypes.len(),
            labels: prototype_labels.len(),
        });
    }
    let n = distances.rows();
    if n > 0 && prototypes.is_empty() {
        return Err(ForestError::NoPrototypes { nodes: n });
    }

    let mut cost = vec![f32::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut label: Vec<Option<i64>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut queue = CostQueue::with_capacity(n);

    for (&prototype, &prototype_label) in prototypes.iter().zip(prototype_labels) {
        if prototype >= n {
            return Err(ForestError::PrototypeOutOfRange {
                prototype,
                nodes: n,
            });
        }
        if parent[prototype].is_some() {
            return Err(ForestError::DuplicatePrototype { prototype });
        }
        cost[prototype] = 0.0;
        parent[prototype] = Some(prototype);
        label[prototype] = Some(prototype_label);
        queue.push(prototype, 0.0);
    }

    let rows: Vec<&[f32]> = distances.iter_rows().take(n).collect();
    while let Some(popped) = queue.pop_unsettled(&settled) {
        let p = popped.node;
        settled[p] = true;
        let path_cost = cost[p];
        let path_label = label[p];
        for (q, &weight) in rows[p].iter().enumerate() {
            if settled[q] {
                continue;
            }
            let candidate = path_cost.max(weight);
            if candidate < cost[q] {
                cost[q] = candidate;
                parent[q] = Some(p);
                label[q] = path_label;
                queue.push(q, candidate);
            }
        }
    }

    let mut sorted = prototypes.to_vec();
    sorted.sort_unstable();
    let forest = PathForest {
        cost,
        // Every node is reachable in a complete graph with finite weights, so
        // each slot was written while seeding or relaxing.
        parent: parent
            .into_iter()
            .enumerate()
            .map(|(node, parent)| parent.unwrap_or(node))
            .collect(),
        label: label.into_iter().map(Option::unwrap_or_default).collect(),
        prototypes: sorted,
    };
    debug!(
        nodes = n,
        prototypes = forest.prototypes.len(),
        "optimum-path forest grown"
    );
    Ok(forest)
}

#[cfg(test)]
mod tests;
