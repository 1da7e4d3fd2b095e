use arrow_schema::{ArrowError, DataType};
use opforest_core::{DataError, OpfError};
use thiserror::Error;

/// Errors raised while loading datasets or persisting models.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound { column: String },
    #[error("column `{column}` must be {expected} but found {actual:?}")]
    InvalidColumnType {
        column: String,
        expected: &'static str,
        actual: DataType,
    },
    #[error("FixedSizeList child type must be Float32 but found {actual:?}")]
    InvalidListValueType { actual: DataType },
    #[error("invalid FixedSizeList dimension {actual}")]
    InvalidDimension { actual: i32 },
    #[error("column `{column}` must not be nullable (nullable child: {nullable_child})")]
    NullableField { column: String, nullable_child: bool },
    #[error("column `{column}` has a null entry at row {row}")]
    NullRow { column: String, row: usize },
    #[error("row {row} contains null value at position {value_index}")]
    NullValue { row: usize, value_index: usize },
    #[error("row {row} has length {actual} but expected {expected}")]
    InvalidRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("matrix with {rows} rows and dimension {dimension} exceeds capacity limits")]
    CapacityOverflow { rows: usize, dimension: usize },
    #[error("inconsistent dimensions across batches: expected {expected}, got {actual}")]
    InconsistentBatchDimension { expected: usize, actual: usize },
    #[error("column `{column}` value at row {row} does not fit the target index type")]
    IndexOutOfRange { column: &'static str, row: usize },
    #[error("{labels} labels were supplied for {rows} feature rows")]
    LabelCountMismatch { rows: usize, labels: usize },
    #[error("no rows carry a label")]
    NoLabelledRows,
    #[error("model metadata is missing `{key}`")]
    MissingMetadata { key: &'static str },
    #[error("model metadata `{key}` has invalid value `{value}`")]
    InvalidMetadata { key: &'static str, value: String },
    #[error("unsupported model format version `{found}`")]
    UnsupportedFormatVersion { found: String },
    #[error("invalid feature data: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] OpfError),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Stable machine-readable identifier for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound { .. } => "STORE_COLUMN_NOT_FOUND",
            Self::InvalidColumnType { .. } => "STORE_INVALID_COLUMN_TYPE",
            Self::InvalidListValueType { .. } => "STORE_INVALID_LIST_VALUE_TYPE",
            Self::InvalidDimension { .. } => "STORE_INVALID_DIMENSION",
            Self::NullableField { .. } => "STORE_NULLABLE_FIELD",
            Self::NullRow { .. } => "STORE_NULL_ROW",
            Self::NullValue { .. } => "STORE_NULL_VALUE",
            Self::InvalidRowLength { .. } => "STORE_INVALID_ROW_LENGTH",
            Self::CapacityOverflow { .. } => "STORE_CAPACITY_OVERFLOW",
            Self::InconsistentBatchDimension { .. } => "STORE_INCONSISTENT_BATCH_DIMENSION",
            Self::IndexOutOfRange { .. } => "STORE_INDEX_OUT_OF_RANGE",
            Self::LabelCountMismatch { .. } => "STORE_LABEL_COUNT_MISMATCH",
            Self::NoLabelledRows => "STORE_NO_LABELLED_ROWS",
            Self::MissingMetadata { .. } => "STORE_MISSING_METADATA",
            Self::InvalidMetadata { .. } => "STORE_INVALID_METADATA",
            Self::UnsupportedFormatVersion { .. } => "STORE_UNSUPPORTED_FORMAT_VERSION",
            Self::Data(_) => "STORE_INVALID_DATA",
            Self::Model(error) => error.code().as_str(),
            Self::Arrow(_) => "STORE_ARROW",
            Self::Parquet(_) => "STORE_PARQUET",
            Self::Io(_) => "STORE_IO",
        }
    }
}
