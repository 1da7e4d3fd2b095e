//! Unit and property tests for forest growth.

use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

use crate::DistanceMatrix;
use crate::test_utils::suite_proptest_config;

use super::{ForestError, ForestErrorCode, PathForest, grow_forest};

fn line(n: usize) -> DistanceMatrix {
    let rows: Vec<Vec<f32>> = (0..n)
        .map(|i| (0..n).map(|j| i.abs_diff(j) as f32).collect())
        .collect();
    DistanceMatrix::try_from_rows(&rows).expect("finite weights")
}

fn random_graph(seed: u64, n: usize) -> DistanceMatrix {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rows = vec![vec![0.0_f32; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = rng.gen_range(0.0..50.0);
            rows[i][j] = weight;
            rows[j][i] = weight;
        }
    }
    DistanceMatrix::try_from_rows(&rows).expect("finite weights")
}

fn check_forest_invariants(forest: &PathForest) -> TestCaseResult {
    let n = forest.len();
    for node in 0..n {
        let parent = forest.parent()[node];
        prop_assert!(parent < n);
        prop_assert!(forest.cost()[node].is_finite(), "node {} unreached", node);
        prop_assert!(
            forest.cost()[node] >= forest.cost()[parent],
            "cost decreases from parent {} to child {}",
            parent,
            node
        );
        prop_assert_eq!(forest.label()[node], forest.label()[parent]);
        let root = forest.root_of(node);
        prop_assert!(root.is_some(), "parent chain from {} has a cycle", node);
        if let Some(root) = root {
            prop_assert!(forest.prototypes().binary_search(&root).is_ok());
            prop_assert_eq!(forest.label()[node], forest.label()[root]);
        }
    }
    for &prototype in forest.prototypes() {
        prop_assert_eq!(forest.cost()[prototype], 0.0);
        prop_assert_eq!(forest.parent()[prototype], prototype);
    }
    Ok(())
}

#[test]
fn costs_follow_bottleneck_not_sum() {
    // Path 0-1-2 has edges 2 and 2: bottleneck 2, sum 4. Direct edge is 3.
    let distances =
        DistanceMatrix::try_from_rows(&[[0.0, 2.0, 3.0], [2.0, 0.0, 2.0], [3.0, 2.0, 0.0]])
            .expect("finite weights");
    let forest = grow_forest(&distances, &[0], &[1]).expect("valid seeds");
    assert_eq!(forest.cost(), &[0.0, 2.0, 2.0]);
    assert_eq!(forest.parent(), &[0, 0, 1]);
}

#[test]
fn competing_prototypes_split_the_line() {
    let forest = grow_forest(&line(6), &[0, 5], &[7, 8]).expect("valid seeds");
    // Node 3 is equidistant; node 2 settles first and claims it.
    assert_eq!(forest.label(), &[7, 7, 7, 7, 8, 8]);
    assert_eq!(forest.cost(), &[0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
    assert_eq!(forest.root_of(3), Some(0));
    assert_eq!(forest.root_of(4), Some(5));
    assert_eq!(forest.root_of(6), None);
}

#[test]
fn prototypes_are_reported_sorted() {
    let forest = grow_forest(&line(4), &[3, 1], &[2, 1]).expect("valid seeds");
    assert_eq!(forest.prototypes(), &[1, 3]);
    assert_eq!(forest.label()[3], 2);
}

#[test]
fn empty_graph_grows_empty_forest() {
    let forest = grow_forest(&line(0), &[], &[]).expect("empty is valid");
    assert!(forest.is_empty());
}

#[rstest]
#[case::no_prototypes(&[], &[], ForestError::NoPrototypes { nodes: 3 })]
#[case::out_of_range(&[3], &[1], ForestError::PrototypeOutOfRange { prototype: 3, nodes: 3 })]
#[case::duplicate(&[1, 1], &[1, 1], ForestError::DuplicatePrototype { prototype: 1 })]
#[case::label_mismatch(&[0, 1], &[1], ForestError::LabelCountMismatch { prototypes: 2, labels: 1 })]
fn rejects_invalid_seeds(
    #[case] prototypes: &[usize],
    #[case] labels: &[i64],
    #[case] expected: ForestError,
) {
    let err = grow_forest(&line(3), prototypes, labels).expect_err("seeds are invalid");
    assert_eq!(err, expected);
}

#[test]
fn rejects_rectangular_matrix() {
    let distances = DistanceMatrix::try_from_rows(&[[0.0, 1.0]]).expect("finite weights");
    let err = grow_forest(&distances, &[0], &[1]).expect_err("not square");
    assert_eq!(err.code(), ForestErrorCode::NotSquare);
}

#[rstest]
#[case(1, 5)]
#[case(7, 12)]
#[case(99, 20)]
fn random_graphs_satisfy_invariants(#[case] seed: u64, #[case] n: usize) {
    let forest = grow_forest(&random_graph(seed, n), &[0, n / 2], &[1, 2]).expect("valid seeds");
    check_forest_invariants(&forest).expect("forest invariants must hold");
}

fn seeded_forest_strategy() -> impl Strategy<Value = (u64, usize, Vec<usize>)> {
    (any::<u64>(), 2_usize..24).prop_flat_map(|(seed, n)| {
        let prototypes = proptest::sample::subsequence((0..n).collect::<Vec<_>>(), 1..=n);
        (Just(seed), Just(n), prototypes)
    })
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn forest_invariants_hold_for_random_graphs(
        (seed, n, prototypes) in seeded_forest_strategy()
    ) {
        let labels: Vec<i64> = prototypes.iter().map(|&p| (p % 3) as i64).collect();
        let forest = grow_forest(&random_graph(seed, n), &prototypes, &labels)
            .map_err(|e| TestCaseError::fail(format!("grow_forest failed: {e}")))?;
        check_forest_invariants(&forest)?;
    }
}
