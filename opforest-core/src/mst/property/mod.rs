//! Property-based tests for the dense Prim implementation.
//!
//! Compares Prim against an exhaustive spanning-tree search on small graphs
//! and validates structural invariants (edge count, connectivity, symmetric
//! adjacency, infinite diagonal) across several weight distributions.

mod oracle;
mod strategies;
mod types;
