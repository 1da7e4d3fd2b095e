use super::{StoreError, support::*};
use crate::model::model_batch;
use crate::{FORMAT_VERSION_KEY, METRIC_KEY, load_model, read_model, save_model};
use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use opforest_core::{ModelError, OpfBuilder, OpfClassifier, OpfError};
use rstest::rstest;
use std::sync::Arc;

fn replace_column(batch: &RecordBatch, name: &str, field: Field, array: ArrayRef) -> RecordBatch {
    let schema = batch.schema();
    let index = schema.index_of(name).expect("column exists");
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns = batch.columns().to_vec();
    fields[index] = field;
    columns[index] = array;
    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), columns).expect("batch")
}

#[rstest]
fn round_trip_preserves_the_model() {
    let model = trained_model();
    let loaded = read_model(model_bytes(&model)).expect("model decodes");
    assert_eq!(loaded, model);
    assert_eq!(loaded.metric().fallback.as_deref(), Some("chebyshev"));
}

#[test]
fn reloaded_model_classifies_identically() {
    let model = trained_model();
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join("model.parquet");
    save_model(&model, &path).expect("model saves");

    let queries = [[0.2, 0.1], [9.5, 9.5], [5.0, 5.0]];
    let original = OpfClassifier::from_model(OpfBuilder::new(), model).expect("valid model");
    let reloaded = OpfClassifier::from_model(
        OpfBuilder::new(),
        load_model(&path).expect("model loads"),
    )
    .expect("valid model");

    assert_eq!(
        reloaded.classify_with_costs(&queries),
        original.classify_with_costs(&queries)
    );
    assert_eq!(reloaded.metric_selection().primary, "cityblock");
}

#[rstest]
#[case(FORMAT_VERSION_KEY, Some("2"))]
#[case(FORMAT_VERSION_KEY, None)]
#[case(METRIC_KEY, None)]
fn malformed_metadata_is_rejected(#[case] key: &str, #[case] value: Option<&str>) {
    let batch = model_batch(&trained_model()).expect("batch");
    let mut metadata = batch.schema().metadata().clone();
    match value {
        Some(value) => metadata.insert(key.to_owned(), value.to_owned()),
        None => metadata.remove(key),
    };
    let schema = batch.schema().as_ref().clone().with_metadata(metadata);
    let batch = RecordBatch::try_new(Arc::new(schema), batch.columns().to_vec()).expect("batch");

    let err = read_model(write_batches(&[batch])).expect_err("metadata is malformed");
    assert!(matches!(
        err,
        StoreError::UnsupportedFormatVersion { .. } | StoreError::MissingMetadata { .. }
    ));
}

#[test]
fn wrong_cost_type_is_rejected() {
    let batch = model_batch(&trained_model()).expect("batch");
    let rows = batch.num_rows();
    let batch = replace_column(
        &batch,
        "cost",
        Field::new("cost", DataType::Float64, false),
        Arc::new(Float64Array::from(vec![0.0; rows])),
    );

    let err = read_model(write_batches(&[batch])).expect_err("cost must be Float32");
    assert!(matches!(
        err,
        StoreError::InvalidColumnType { column, actual: DataType::Float64, .. } if column == "cost"
    ));
}

#[test]
fn broken_label_propagation_is_rejected() {
    let model = trained_model();
    let batch = model_batch(&model).expect("batch");
    let mut assigned = model.assigned().to_vec();
    let victim = (0..assigned.len())
        .find(|node| !model.prototypes().contains(node))
        .expect("a non-prototype node");
    assigned[victim] = model.labels()[model.prototypes()[0]] + 100;
    let batch = replace_column(
        &batch,
        "assigned",
        Field::new("assigned", DataType::Int64, false),
        Arc::new(Int64Array::from(assigned)),
    );

    let err = read_model(write_batches(&[batch])).expect_err("labels must propagate");
    assert!(matches!(
        err,
        StoreError::Model(OpfError::InvalidModel(ModelError::LabelNotPropagated { .. }))
    ));
}
