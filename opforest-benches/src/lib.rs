//! Benchmark support crate for opforest.
//!
//! Provides the synthetic workloads and parameter types shared by the
//! Criterion benchmarks for training stages and classification.

pub mod error;
pub mod params;
pub mod workload;
