//! Exhaustive spanning-tree search used as the reference for Prim.

use crate::DistanceMatrix;

/// Returns the minimum total weight over every spanning tree of the complete
/// graph, or `0.0` for graphs with fewer than two nodes.
///
/// Backtracks over edge subsets in index order, pruning subsets that would
/// close a cycle, so only forests are ever extended.
pub(super) fn brute_force_minimum_weight(distances: &DistanceMatrix) -> f64 {
    let n = distances.rows();
    if n < 2 {
        return 0.0;
    }
    let mut edges = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = distances.get(i, j).expect("index within matrix");
            edges.push((i, j, f64::from(weight)));
        }
    }
    let mut best = f64::INFINITY;
    let parents: Vec<usize> = (0..n).collect();
    search(&edges, 0, n - 1, &parents, 0.0, &mut best);
    best
}

fn search(
    edges: &[(usize, usize, f64)],
    start: usize,
    remaining: usize,
    parents: &[usize],
    weight: f64,
    best: &mut f64,
) {
    if remaining == 0 {
        *best = best.min(weight);
        return;
    }
    if edges.len() - start < remaining {
        return;
    }
    for (offset, &(left, right, edge_weight)) in edges[start..].iter().enumerate() {
        let mut next = parents.to_vec();
        let left_root = find_root(&mut next, left);
        let right_root = find_root(&mut next, right);
        if left_root == right_root {
            continue;
        }
        next[right_root] = left_root;
        search(
            edges,
            start + offset + 1,
            remaining - 1,
            &next,
            weight + edge_weight,
            best,
        );
    }
}

/// Path-compressing find for union-find verification.
pub(super) fn find_root(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}
