//! Shared test utilities used across the opforest crates.
//!
//! Provides a tracing recorder for asserting instrumentation, the
//! environment-driven property-test profile, and small synthetic datasets.

pub mod ci;
pub mod datasets;
pub mod tracing;
