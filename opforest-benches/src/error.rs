//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of panicking
//! inside Criterion closures.

use opforest_core::{DataError, MetricChainError, MstError, OpfError, PrototypeError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// The synthetic feature rows did not form a valid matrix.
    #[error("synthetic feature matrix is invalid: {0}")]
    Data(#[from] DataError),
    /// Pairwise distances could not be computed.
    #[error("distance computation failed: {0}")]
    MetricChain(#[from] MetricChainError),
    /// MST computation failed.
    #[error("MST computation failed: {0}")]
    Mst(#[from] MstError),
    /// Prototype selection failed.
    #[error("prototype selection failed: {0}")]
    Prototype(#[from] PrototypeError),
    /// Building or training the classifier failed.
    #[error("classifier operation failed: {0}")]
    Classifier(#[from] OpfError),
}
