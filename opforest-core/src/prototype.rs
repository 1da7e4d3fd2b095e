//! Prototype selection from the spanning tree's class boundaries.

use thiserror::Error;
use tracing::debug;

use crate::{error::define_error_codes, mst::MinimumSpanningTree};

/// Errors returned while selecting prototypes.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum PrototypeError {
    /// The label vector did not cover every tree node.
    #[error("tree spans {nodes} nodes but {labels} labels were supplied")]
    LabelCountMismatch {
        /// Nodes in the tree.
        nodes: usize,
        /// Labels supplied.
        labels: usize,
    },
}

define_error_codes! {
    /// Machine-readable error codes for [`PrototypeError`].
    enum PrototypeErrorCode for PrototypeError {
        /// The label vector did not cover every tree node.
        LabelCountMismatch => LabelCountMismatch { .. } => "PROTOTYPE_LABEL_COUNT_MISMATCH",
    }
}

/// Returns the sorted indices of nodes that share a tree edge with a node of
/// another class.
///
/// When every node carries the same label no edge crosses a boundary, so the
/// tree root (node 0) is returned as the only seed. An empty tree yields no
/// prototypes.
///
/// # Errors
/// Returns [`PrototypeError::LabelCountMismatch`] when `labels` does not have
/// one entry per node.
///
/// # Examples
/// ```
/// use opforest_core::{DistanceMatrix, prim_mst, select_prototypes};
///
/// let distances = DistanceMatrix::try_from_rows(&[
///     [0.0, 1.0, 5.0],
///     [1.0, 0.0, 2.0],
///     [5.0, 2.0, 0.0],
/// ])?;
/// let tree = prim_mst(&distances)?;
/// assert_eq!(select_prototypes(&tree, &[7, 7, 9])?, vec![1, 2]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn select_prototypes(
    tree: &MinimumSpanningTree,
    labels: &[i64],
) -> Result<Vec<usize>, PrototypeError> {
    if labels.len() != tree.node_count() {
        return Err(PrototypeError::LabelCountMismatch {
            nodes: tree.node_count(),
            labels: labels.len(),
        });
    }

    let mut prototypes: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|&(node, own)| tree.neighbours(node).any(|other| labels[other] != *own))
        .map(|(node, _)| node)
        .collect();

    if prototypes.is_empty() && !labels.is_empty() {
        prototypes.push(0);
    }
    debug!(
        nodes = labels.len(),
        prototypes = prototypes.len(),
        "prototypes selected"
    );
    Ok(prototypes)
}
