//! Helpers for ingesting Arrow columns into dense buffers.
use std::sync::Arc;

use arrow_array::{Array, ArrayRef, FixedSizeListArray, Float32Array, Int32Array, Int64Array};
use arrow_schema::{DataType, Field, Schema};

use crate::errors::StoreError;

pub(crate) fn column_index(schema: &Schema, column: &str) -> Result<usize, StoreError> {
    schema
        .index_of(column)
        .map_err(|_| StoreError::ColumnNotFound {
            column: column.to_owned(),
        })
}

/// Non-nullable `FixedSizeList<Float32, dimension>` field named `name`.
pub(crate) fn fixed_size_list_field(name: &str, dimension: i32) -> Field {
    Field::new(
        name,
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, false)),
            dimension,
        ),
        false,
    )
}

pub(crate) fn validate_fixed_size_list_field(
    field: &Field,
    column: &str,
) -> Result<usize, StoreError> {
    match field.data_type() {
        DataType::FixedSizeList(child, width) => {
            if field.is_nullable() || child.is_nullable() {
                return Err(StoreError::NullableField {
                    column: column.to_owned(),
                    nullable_child: child.is_nullable(),
                });
            }
            if child.data_type() != &DataType::Float32 {
                return Err(StoreError::InvalidListValueType {
                    actual: child.data_type().clone(),
                });
            }
            usize::try_from(*width).map_err(|_| StoreError::InvalidDimension { actual: *width })
        }
        other => Err(StoreError::InvalidColumnType {
            column: column.to_owned(),
            expected: "FixedSizeList<Float32, _>",
            actual: other.clone(),
        }),
    }
}

/// Checks that `field` is a non-nullable column of exactly `expected`.
pub(crate) fn validate_scalar_field(
    field: &Field,
    column: &str,
    expected: &DataType,
    description: &'static str,
) -> Result<(), StoreError> {
    if field.data_type() != expected {
        return Err(StoreError::InvalidColumnType {
            column: column.to_owned(),
            expected: description,
            actual: field.data_type().clone(),
        });
    }
    if field.is_nullable() {
        return Err(StoreError::NullableField {
            column: column.to_owned(),
            nullable_child: false,
        });
    }
    Ok(())
}

/// Downcasts `array` or reports the column's actual type.
pub(crate) fn downcast_column<'a, T: Array + 'static>(
    array: &'a ArrayRef,
    column: &str,
    expected: &'static str,
) -> Result<&'a T, StoreError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| StoreError::InvalidColumnType {
            column: column.to_owned(),
            expected,
            actual: array.data_type().clone(),
        })
}

pub(crate) fn append_fixed_size_list_values(
    array: &FixedSizeListArray,
    expected_dimension: Option<usize>,
    start_row: usize,
    out: &mut Vec<f32>,
) -> Result<usize, StoreError> {
    let dimension = validate_fixed_size_list(array)?;
    if let Some(expected) = expected_dimension.filter(|&expected| expected != dimension) {
        return Err(StoreError::InconsistentBatchDimension {
            expected,
            actual: dimension,
        });
    }
    copy_list_values(array, dimension, start_row, out)?;
    Ok(dimension)
}

pub(crate) fn validate_fixed_size_list(array: &FixedSizeListArray) -> Result<usize, StoreError> {
    let value_type = array.value_type();
    if value_type != DataType::Float32 {
        return Err(StoreError::InvalidListValueType { actual: value_type });
    }
    usize::try_from(array.value_length()).map_err(|_| StoreError::InvalidDimension {
        actual: array.value_length(),
    })
}

pub(crate) fn copy_list_values(
    array: &FixedSizeListArray,
    dimension: usize,
    start_row: usize,
    out: &mut Vec<f32>,
) -> Result<(), StoreError> {
    let rows = array.len();
    let additional = rows
        .checked_mul(dimension)
        .ok_or(StoreError::CapacityOverflow { rows, dimension })?;
    out.reserve(additional);
    for row_index in 0..rows {
        let absolute_row = start_row + row_index;
        if array.is_null(row_index) {
            return Err(StoreError::NullRow {
                column: "features".to_owned(),
                row: absolute_row,
            });
        }
        let row = array.value(row_index);
        let floats = row.as_any().downcast_ref::<Float32Array>().ok_or_else(|| {
            StoreError::InvalidListValueType {
                actual: row.data_type().clone(),
            }
        })?;
        if floats.len() != dimension {
            return Err(StoreError::InvalidRowLength {
                row: absolute_row,
                expected: dimension,
                actual: floats.len(),
            });
        }
        if let Some(value_index) = (0..dimension).find(|&idx| floats.is_null(idx)) {
            return Err(StoreError::NullValue {
                row: absolute_row,
                value_index,
            });
        }
        out.extend_from_slice(floats.values());
    }
    Ok(())
}

/// Appends an `Int64` or `Int32` label column, keeping nulls as `None`.
pub(crate) fn append_optional_labels(
    array: &ArrayRef,
    column: &str,
    out: &mut Vec<Option<i64>>,
) -> Result<(), StoreError> {
    match array.data_type() {
        DataType::Int64 => {
            let labels = downcast_column::<Int64Array>(array, column, "Int64 or Int32")?;
            out.extend(labels.iter());
        }
        DataType::Int32 => {
            let labels = downcast_column::<Int32Array>(array, column, "Int64 or Int32")?;
            out.extend(labels.iter().map(|label| label.map(i64::from)));
        }
        other => {
            return Err(StoreError::InvalidColumnType {
                column: column.to_owned(),
                expected: "Int64 or Int32",
                actual: other.clone(),
            });
        }
    }
    Ok(())
}
