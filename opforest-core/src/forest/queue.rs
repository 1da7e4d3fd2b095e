//! Min-priority queue of tentative path costs with stale-entry handling.

use std::{cmp::Ordering, collections::BinaryHeap};

/// A tentative `(cost, node)` pair. Ordered so that [`BinaryHeap`] pops the
/// smallest cost first and, among equal costs, the lowest node index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Candidate {
    pub(super) cost: f32,
    pub(super) node: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary heap that tolerates duplicate entries per node.
///
/// Improving a node's cost pushes a fresh entry instead of decreasing the old
/// key; [`CostQueue::pop_unsettled`] discards entries for nodes that have
/// already been settled.
#[derive(Debug, Default)]
pub(super) struct CostQueue {
    heap: BinaryHeap<Candidate>,
}

impl CostQueue {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub(super) fn push(&mut self, node: usize, cost: f32) {
        self.heap.push(Candidate { cost, node });
    }

    /// Pops the cheapest entry whose node is not yet settled.
    pub(super) fn pop_unsettled(&mut self, settled: &[bool]) -> Option<Candidate> {
        while let Some(candidate) = self.heap.pop() {
            if !settled.get(candidate.node).copied().unwrap_or(true) {
                return Some(candidate);
            }
        }
        None
    }
}
