//! Minimum spanning tree construction over a dense distance matrix.
//!
//! The training graph is complete, so the classic O(n²) Prim variant with a
//! linear-scan argmin outperforms heap-based approaches: every node is
//! adjacent to every other node and each step would touch the heap `n` times
//! anyway. Ties are broken towards the lowest node index, which makes the
//! chosen edge set a pure function of the input matrix.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{distance::DistanceMatrix, error::define_error_codes};

/// Errors returned while computing a minimum spanning tree.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum MstError {
    /// The distance matrix was not square.
    #[error("distance matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns supplied.
        cols: usize,
    },
    /// A distance could not be used as an edge weight.
    #[error("edge ({left}, {right}) has non-finite weight")]
    NonFiniteWeight {
        /// Row of the offending entry.
        left: usize,
        /// Column of the offending entry.
        right: usize,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`MstError`].
    enum MstErrorCode for MstError {
        /// The distance matrix was not square.
        NotSquare => NotSquare { .. } => "MST_NOT_SQUARE",
        /// A distance could not be used as an edge weight.
        NonFiniteWeight => NonFiniteWeight { .. } => "MST_NON_FINITE_WEIGHT",
    }
}

/// A single MST edge in canonical undirected form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    source: usize,
    target: usize,
    weight: f32,
}

impl MstEdge {
    fn new(left: usize, right: usize, weight: f32) -> Self {
        Self {
            source: left.min(right),
            target: left.max(right),
            weight,
        }
    }

    /// Returns the smaller endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the larger endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn target(&self) -> usize { self.target }

    /// Returns the edge weight.
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f32 { self.weight }
}

impl fmt::Display for MstEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}; {})", self.source, self.target, self.weight)
    }
}

/// Dense spanning tree over `n` nodes.
///
/// The adjacency matrix holds the edge weight at `(i, j)` and `(j, i)` for
/// every tree edge and `+∞` everywhere else, including the diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimumSpanningTree {
    node_count: usize,
    adjacency: Vec<f32>,
    edges: Vec<MstEdge>,
}

impl MinimumSpanningTree {
    /// Returns the number of nodes spanned by the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the edges in the order Prim added them.
    #[must_use]
    pub fn edges(&self) -> &[MstEdge] {
        &self.edges
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|edge| f64::from(edge.weight)).sum()
    }

    /// Returns the weight of edge `(i, j)`, or `None` when the tree does not
    /// contain it.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.node_count || j >= self.node_count {
            return None;
        }
        self.adjacency
            .get(i * self.node_count + j)
            .copied()
            .filter(|weight| weight.is_finite())
    }

    /// Iterates over the tree neighbours of `node` in ascending index order.
    pub fn neighbours(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        let row = if node < self.node_count {
            let start = node * self.node_count;
            self.adjacency
                .get(start..start + self.node_count)
                .unwrap_or_default()
        } else {
            &[]
        };
        row.iter()
            .enumerate()
            .filter(|(_, weight)| weight.is_finite())
            .map(|(index, _)| index)
    }

    /// Returns the row-major adjacency matrix with `+∞` for absent edges.
    #[must_use]
    pub fn adjacency(&self) -> &[f32] {
        &self.adjacency
    }
}

/// Builds the minimum spanning tree of the complete graph described by
/// `distances` using dense Prim from node 0.
///
/// # Errors
/// Returns [`MstError::NotSquare`] for rectangular input and
/// [`MstError::NonFiniteWeight`] when any entry is NaN or infinite.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceMatrix, prim_mst};
///
/// let distances = DistanceMatrix::try_from_rows(&[
///     [0.0, 1.0, 4.0],
///     [1.0, 0.0, 2.0],
///     [4.0, 2.0, 0.0],
/// ])?;
/// let tree = prim_mst(&distances)?;
/// assert_eq!(tree.edge_count(), 2);
/// assert_eq!(tree.weight(1, 2), Some(2.0));
/// assert_eq!(tree.weight(0, 2), None);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn prim_mst(distances: &DistanceMatrix) -> Result<MinimumSpanningTree, MstError> {
    if !distances.is_square() {
        return Err(MstError::NotSquare {
            rows: distances.rows(),
            cols: distances.cols(),
        });
    }
    let n = distances.rows();
    if let Some(position) = distances.as_slice().iter().position(|w| !w.is_finite()) {
        return Err(MstError::NonFiniteWeight {
            left: position / n,
            right: position % n,
        });
    }

    let rows: Vec<&[f32]> = distances.iter_rows().take(n).collect();
    let mut adjacency = vec![f32::INFINITY; n * n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    let mut in_tree = vec![false; n];
    let mut best = vec![f32::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    if let Some(root) = best.first_mut() {
        *root = 0.0;
    }

    while let Some(next) = closest_outside(&in_tree, &best) {
        in_tree[next] = true;
        if let Some(parent) = predecessor[next] {
            let weight = rows[next][parent];
            adjacency[next * n + parent] = weight;
            adjacency[parent * n + next] = weight;
            edges.push(MstEdge::new(parent, next, weight));
        }
        for (candidate, &weight) in rows[next].iter().enumerate() {
            if !in_tree[candidate] && weight < best[candidate] {
                best[candidate] = weight;
                predecessor[candidate] = Some(next);
            }
        }
    }

    let tree = MinimumSpanningTree {
        node_count: n,
        adjacency,
        edges,
    };
    debug!(
        nodes = n,
        edges = tree.edge_count(),
        total_weight = tree.total_weight(),
        "minimum spanning tree built"
    );
    Ok(tree)
}

/// Linear-scan argmin over nodes outside the tree; the lowest index wins ties.
fn closest_outside(in_tree: &[bool], best: &[f32]) -> Option<usize> {
    let mut chosen: Option<usize> = None;
    for (node, (&inside, &distance)) in in_tree.iter().zip(best).enumerate() {
        if inside {
            continue;
        }
        match chosen {
            Some(current) if best[current] <= distance => {}
            _ => chosen = Some(node),
        }
    }
    chosen
}

#[cfg(test)]
mod property;
#[cfg(test)]
mod tests;
