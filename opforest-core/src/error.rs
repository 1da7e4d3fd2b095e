//! Error types for the opforest core library.
//!
//! Defines error enums exposed by the public API, their stable codes, and a
//! convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::{
    distance::MetricChainError, forest::ForestError, model::ModelError, mst::MstError,
    prototype::PrototypeError,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::core::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Identifies which input matrix a validation failure refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatrixRole {
    /// The matrix passed to `fit`.
    Training,
    /// The matrix passed to `classify`.
    Test,
}

impl fmt::Display for MatrixRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Training => f.write_str("training"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// An error produced while validating a [`crate::FeatureMatrix`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataError {
    /// The matrix contained no rows.
    #[error("feature matrix contains no rows")]
    EmptyData,
    /// Rows must have positive dimension.
    #[error("feature vectors must have positive dimension")]
    ZeroDimension,
    /// A row's length differed from the first row's length.
    #[error("row {row} has length {actual} but expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Dimension established by the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A row contained NaN or an infinity.
    #[error("row {row} contains a non-finite value at column {column}: {value}")]
    NonFinite {
        /// Index of the offending row.
        row: usize,
        /// Column of the offending value.
        column: usize,
        /// The offending value.
        value: f32,
    },
    /// A flat buffer did not hold `rows * dimension` values.
    #[error("buffer holds {values} values but {rows} rows of dimension {dimension} were declared")]
    ValueCountMismatch {
        /// Declared number of rows.
        rows: usize,
        /// Declared dimension.
        dimension: usize,
        /// Values actually supplied.
        values: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DataError`] variants.
    enum DataErrorCode for DataError {
        /// The matrix contained no rows.
        EmptyData => EmptyData => "DATA_EMPTY",
        /// Rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_ZERO_DIMENSION",
        /// A row's length differed from the first row's length.
        RaggedRow => RaggedRow { .. } => "DATA_RAGGED_ROW",
        /// A row contained NaN or an infinity.
        NonFinite => NonFinite { .. } => "DATA_NON_FINITE",
        /// A flat buffer did not hold `rows * dimension` values.
        ValueCountMismatch => ValueCountMismatch { .. } => "DATA_VALUE_COUNT_MISMATCH",
    }
}

/// Coarse classification used by orchestration code to decide whether to
/// retry, fall back, or abort.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The caller supplied invalid input or used the API out of order.
    Precondition,
    /// Every tier of the metric fallback chain failed.
    Metric,
    /// An internal invariant was violated.
    Fatal,
}

/// Error type produced when configuring, training, or querying an
/// [`crate::OpfClassifier`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OpfError {
    /// The configured sentinel margin must be at least one.
    #[error("sentinel margin must be at least 1 (got {got})")]
    InvalidSentinelMargin {
        /// The rejected margin.
        got: i64,
    },
    /// A configured metric name was blank.
    #[error("{tier} metric name must not be empty")]
    EmptyMetricName {
        /// Which tier carried the blank name.
        tier: &'static str,
    },
    /// `fit` was called without samples.
    #[error("training set contains no samples")]
    EmptyTrainingSet,
    /// Feature and label vectors had different lengths.
    #[error("{samples} feature vectors were supplied with {labels} labels")]
    LabelCountMismatch {
        /// Number of feature vectors.
        samples: usize,
        /// Number of labels.
        labels: usize,
    },
    /// A feature matrix failed validation.
    #[error("{role} features are malformed: {error}")]
    InvalidFeatures {
        /// Which matrix failed.
        role: MatrixRole,
        /// Underlying validation failure.
        #[source]
        error: DataError,
    },
    /// Test vectors did not match the training dimensionality.
    #[error("test vectors have dimension {actual} but the model expects {expected}")]
    DimensionMismatch {
        /// Training dimensionality.
        expected: usize,
        /// Dimensionality of the offending test matrix.
        actual: usize,
    },
    /// `fit` was called on a classifier that already holds a model.
    #[error("classifier is already trained")]
    AlreadyTrained,
    /// A query was issued before `fit`.
    #[error("classifier has not been trained")]
    NotTrained,
    /// `min(labels) - margin` does not fit in an `i64`.
    #[error("cannot place the unknown-label sentinel {margin} below label {min_label}")]
    SentinelOverflow {
        /// Smallest observed label.
        min_label: i64,
        /// Configured margin.
        margin: i64,
    },
    /// The unknown-label sentinel coincided with a real label.
    #[error("unknown-label sentinel {sentinel} collides with a training label")]
    LabelCollision {
        /// The colliding sentinel.
        sentinel: i64,
    },
    /// Every metric in the fallback chain failed.
    #[error(transparent)]
    Metric(#[from] MetricChainError),
    /// Spanning-tree construction failed.
    #[error(transparent)]
    Mst(#[from] MstError),
    /// Prototype selection failed.
    #[error(transparent)]
    Prototype(#[from] PrototypeError),
    /// Path-forest construction failed.
    #[error(transparent)]
    Forest(#[from] ForestError),
    /// A model assembled from parts violated a model invariant.
    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),
}

define_error_codes! {
    /// Stable codes describing [`OpfError`] variants.
    enum OpfErrorCode for OpfError {
        /// The configured sentinel margin must be at least one.
        InvalidSentinelMargin => InvalidSentinelMargin { .. } => "OPF_INVALID_SENTINEL_MARGIN",
        /// A configured metric name was blank.
        EmptyMetricName => EmptyMetricName { .. } => "OPF_EMPTY_METRIC_NAME",
        /// `fit` was called without samples.
        EmptyTrainingSet => EmptyTrainingSet => "OPF_EMPTY_TRAINING_SET",
        /// Feature and label vectors had different lengths.
        LabelCountMismatch => LabelCountMismatch { .. } => "OPF_LABEL_COUNT_MISMATCH",
        /// A feature matrix failed validation.
        InvalidFeatures => InvalidFeatures { .. } => "OPF_INVALID_FEATURES",
        /// Test vectors did not match the training dimensionality.
        DimensionMismatch => DimensionMismatch { .. } => "OPF_DIMENSION_MISMATCH",
        /// `fit` was called on a trained classifier.
        AlreadyTrained => AlreadyTrained => "OPF_ALREADY_TRAINED",
        /// A query was issued before `fit`.
        NotTrained => NotTrained => "OPF_NOT_TRAINED",
        /// The sentinel could not be placed below the smallest label.
        SentinelOverflow => SentinelOverflow { .. } => "OPF_SENTINEL_OVERFLOW",
        /// The sentinel coincided with a real label.
        LabelCollision => LabelCollision { .. } => "OPF_LABEL_COLLISION",
        /// Every metric in the fallback chain failed.
        MetricFailure => Metric(..) => "OPF_METRIC_FAILURE",
        /// Spanning-tree construction failed.
        MstFailure => Mst(..) => "OPF_MST_FAILURE",
        /// Prototype selection failed.
        PrototypeFailure => Prototype(..) => "OPF_PROTOTYPE_FAILURE",
        /// Path-forest construction failed.
        ForestFailure => Forest(..) => "OPF_FOREST_FAILURE",
        /// A model assembled from parts was invalid.
        InvalidModel => InvalidModel(..) => "OPF_INVALID_MODEL",
    }
}

impl OpfError {
    /// Classifies the error for orchestration decisions.
    ///
    /// # Examples
    /// ```
    /// use opforest_core::{ErrorKind, OpfError};
    ///
    /// assert_eq!(OpfError::NotTrained.kind(), ErrorKind::Precondition);
    /// assert_eq!(
    ///     OpfError::LabelCollision { sentinel: -1 }.kind(),
    ///     ErrorKind::Fatal,
    /// );
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSentinelMargin { .. }
            | Self::EmptyMetricName { .. }
            | Self::EmptyTrainingSet
            | Self::LabelCountMismatch { .. }
            | Self::InvalidFeatures { .. }
            | Self::DimensionMismatch { .. }
            | Self::AlreadyTrained
            | Self::NotTrained
            | Self::SentinelOverflow { .. } => ErrorKind::Precondition,
            Self::Metric(_) => ErrorKind::Metric,
            Self::LabelCollision { .. }
            | Self::Mst(_)
            | Self::Prototype(_)
            | Self::Forest(_)
            | Self::InvalidModel(_) => ErrorKind::Fatal,
        }
    }

    /// Retrieve the inner [`DataErrorCode`] when the error came from matrix
    /// validation.
    pub const fn data_code(&self) -> Option<DataErrorCode> {
        match self {
            Self::InvalidFeatures { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, OpfError>;
