use super::{StoreError, support::*};
use crate::ingest::{
    append_fixed_size_list_values, append_optional_labels, copy_list_values,
    validate_fixed_size_list_field, validate_scalar_field,
};
use arrow_array::{ArrayRef, Float32Array, Int32Array};
use arrow_schema::{DataType, Field};
use rstest::rstest;
use std::sync::Arc;

#[test]
fn validate_field_rejects_negative_dimension() {
    let child = Arc::new(Field::new("item", DataType::Float32, false));
    let field = Field::new("features", DataType::FixedSizeList(child, -1), false);
    let err = validate_fixed_size_list_field(&field, "features")
        .expect_err("negative dimension must be rejected");
    assert!(matches!(err, StoreError::InvalidDimension { actual: -1 }));
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
fn validate_field_rejects_nullable_lists(
    #[case] list_nullable: bool,
    #[case] child_nullable: bool,
) {
    let field = feature_field(3, child_nullable, list_nullable);
    let err = validate_fixed_size_list_field(&field, "features")
        .expect_err("nullable schema must be rejected");
    assert!(matches!(
        err,
        StoreError::NullableField {
            column,
            nullable_child
        } if column == "features" && nullable_child == child_nullable
    ));
}

#[test]
fn copy_list_values_rejects_incorrect_length() {
    let array = build_list_array(&[vec![1.0, 2.0]], 2, false);
    let mut values = Vec::new();
    let err = copy_list_values(&array, 3, 0, &mut values)
        .expect_err("incorrect lengths must be rejected");
    assert!(matches!(
        err,
        StoreError::InvalidRowLength {
            row: 0,
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn append_rejects_dimension_change_between_batches() {
    let array = build_list_array(&[vec![1.0, 2.0]], 2, false);
    let mut values = Vec::new();
    let err = append_fixed_size_list_values(&array, Some(3), 4, &mut values)
        .expect_err("dimension change");
    assert!(matches!(
        err,
        StoreError::InconsistentBatchDimension {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn append_copies_rows_in_order() {
    let array = build_list_array(&[vec![1.0, 2.0], vec![3.0, 4.0]], 2, false);
    let mut values = vec![0.5, 0.5];
    let dimension =
        append_fixed_size_list_values(&array, Some(2), 1, &mut values).expect("valid rows");
    assert_eq!(dimension, 2);
    assert_eq!(values, vec![0.5, 0.5, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn int32_labels_widen_and_keep_nulls() {
    let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(4), None, Some(-2)]));
    let mut labels = Vec::new();
    append_optional_labels(&array, "class", &mut labels).expect("integer labels");
    assert_eq!(labels, vec![Some(4), None, Some(-2)]);
}

#[test]
fn float_labels_are_rejected() {
    let array: ArrayRef = Arc::new(Float32Array::from(vec![1.0]));
    let err = append_optional_labels(&array, "class", &mut Vec::new()).expect_err("float labels");
    assert!(matches!(
        err,
        StoreError::InvalidColumnType { column, actual: DataType::Float32, .. } if column == "class"
    ));
}

#[rstest]
#[case(Field::new("cost", DataType::Float64, false))]
#[case(Field::new("cost", DataType::Float32, true))]
fn scalar_fields_must_match_exactly(#[case] field: Field) {
    assert!(validate_scalar_field(&field, "cost", &DataType::Float32, "Float32").is_err());
}
