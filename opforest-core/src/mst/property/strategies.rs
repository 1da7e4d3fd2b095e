//! Strategy builders for MST property-based tests.
//!
//! Graphs are kept small enough for the exhaustive oracle to enumerate every
//! spanning tree.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::DistanceMatrix;

use super::types::{MstFixture, WeightDistribution};

/// Largest graph handed to the exhaustive oracle.
pub(super) const MAX_NODES: usize = 7;

/// Generates fixtures covering every weight distribution.
pub(super) fn mst_fixture_strategy() -> impl Strategy<Value = MstFixture> {
    let distribution = prop_oneof![
        1 => Just(WeightDistribution::Unique),
        2 => Just(WeightDistribution::ManyIdentical),
        1 => Just(WeightDistribution::Geometric),
    ];
    (distribution, any::<u64>()).prop_map(|(distribution, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(distribution, &mut rng, MAX_NODES)
    })
}

/// Generates a fixture for a specific weight distribution.
pub(super) fn generate_fixture(
    distribution: WeightDistribution,
    rng: &mut SmallRng,
    max_nodes: usize,
) -> MstFixture {
    let node_count = rng.gen_range(1..=max_nodes);
    let rows = match distribution {
        WeightDistribution::Unique => symmetric(node_count, || rng.gen_range(0.0_f32..100.0)),
        WeightDistribution::ManyIdentical => {
            symmetric(node_count, || f32::from(rng.gen_range(1_u8..=3)))
        }
        WeightDistribution::Geometric => {
            let points: Vec<(f32, f32)> = (0..node_count)
                .map(|_| (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)))
                .collect();
            points
                .iter()
                .map(|&(ax, ay)| {
                    points
                        .iter()
                        .map(|&(bx, by)| (ax - bx).hypot(ay - by))
                        .collect()
                })
                .collect()
        }
    };
    MstFixture {
        distances: DistanceMatrix::try_from_rows(&rows).expect("generated weights are finite"),
        distribution,
    }
}

fn symmetric(node_count: usize, mut weight: impl FnMut() -> f32) -> Vec<Vec<f32>> {
    let mut rows = vec![vec![0.0; node_count]; node_count];
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let value = weight();
            rows[i][j] = value;
            rows[j][i] = value;
        }
    }
    rows
}
