//! Unit tests for dense Prim.

use rstest::rstest;

use crate::DistanceMatrix;

use super::{MstError, MstErrorCode, prim_mst};

fn matrix(rows: &[&[f32]]) -> DistanceMatrix {
    DistanceMatrix::try_from_rows(rows).expect("test matrix must be valid")
}

#[test]
fn empty_matrix_yields_empty_tree() {
    let tree = prim_mst(&matrix(&[])).expect("empty input is valid");
    assert_eq!(tree.node_count(), 0);
    assert_eq!(tree.edge_count(), 0);
    assert!(tree.adjacency().is_empty());
}

#[test]
fn single_node_has_no_edges() {
    let tree = prim_mst(&matrix(&[&[0.0]])).expect("single node is valid");
    assert_eq!(tree.edge_count(), 0);
    assert_eq!(tree.weight(0, 0), None);
    assert_eq!(tree.neighbours(0).count(), 0);
}

#[test]
fn picks_cheapest_edges_of_square() {
    // 0 - 1 - 2 - 3 chain is cheap, diagonals expensive.
    let tree = prim_mst(&matrix(&[
        &[0.0, 1.0, 5.0, 9.0],
        &[1.0, 0.0, 2.0, 5.0],
        &[5.0, 2.0, 0.0, 3.0],
        &[9.0, 5.0, 3.0, 0.0],
    ]))
    .expect("valid matrix");

    let edges: Vec<_> = tree
        .edges()
        .iter()
        .map(|edge| (edge.source(), edge.target(), edge.weight()))
        .collect();
    assert_eq!(edges, vec![(0, 1, 1.0), (1, 2, 2.0), (2, 3, 3.0)]);
    assert_eq!(tree.total_weight(), 6.0);
    assert_eq!(tree.neighbours(1).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(tree.weight(3, 2), Some(3.0));
    assert_eq!(tree.weight(0, 3), None);
}

#[test]
fn equal_weights_attach_to_lowest_index() {
    let tree = prim_mst(&matrix(&[
        &[0.0, 1.0, 1.0],
        &[1.0, 0.0, 1.0],
        &[1.0, 1.0, 0.0],
    ]))
    .expect("valid matrix");

    let edges: Vec<_> = tree
        .edges()
        .iter()
        .map(|edge| (edge.source(), edge.target()))
        .collect();
    assert_eq!(edges, vec![(0, 1), (0, 2)]);
}

#[test]
fn zero_distance_duplicates_are_connected() {
    let tree = prim_mst(&matrix(&[&[0.0, 0.0], &[0.0, 0.0]])).expect("valid matrix");
    assert_eq!(tree.weight(0, 1), Some(0.0));
    assert_eq!(tree.edge_count(), 1);
}

#[test]
fn rejects_rectangular_matrix() {
    let err = prim_mst(&matrix(&[&[0.0, 1.0]])).expect_err("1x2 is not square");
    assert_eq!(err, MstError::NotSquare { rows: 1, cols: 2 });
    assert_eq!(err.code(), MstErrorCode::NotSquare);
}

#[rstest]
#[case(MstErrorCode::NotSquare, "MST_NOT_SQUARE")]
#[case(MstErrorCode::NonFiniteWeight, "MST_NON_FINITE_WEIGHT")]
fn codes_are_stable(#[case] code: MstErrorCode, #[case] expected: &str) {
    assert_eq!(code.as_str(), expected);
}
