use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use opforest_core::{OpfBuilder, TrainedModel};
use parquet::arrow::arrow_writer::ArrowWriter;

pub(crate) fn build_list_array(
    rows: &[Vec<f32>],
    dimension: usize,
    child_nullable: bool,
) -> FixedSizeListArray {
    assert!(rows.iter().all(|row| row.len() == dimension));
    let values = Float32Array::from_iter_values(rows.iter().flatten().copied());
    FixedSizeListArray::new(
        Arc::new(Field::new("item", DataType::Float32, child_nullable)),
        i32::try_from(dimension).expect("dimension fits in i32"),
        Arc::new(values) as ArrayRef,
        None,
    )
}

pub(crate) fn feature_field(dimension: usize, child_nullable: bool, list_nullable: bool) -> Field {
    Field::new(
        "features",
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, child_nullable)),
            i32::try_from(dimension).expect("dimension fits in i32"),
        ),
        list_nullable,
    )
}

/// A batch with a 2-d `features` column and a nullable `Int64` `class` column.
pub(crate) fn labelled_batch(rows: &[[f32; 2]], labels: Vec<Option<i64>>) -> RecordBatch {
    let rows = rows.iter().map(|row| row.to_vec()).collect::<Vec<_>>();
    let schema = Arc::new(Schema::new(vec![
        feature_field(2, false, false),
        Field::new("class", DataType::Int64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(build_list_array(&rows, 2, false)) as ArrayRef,
            Arc::new(Int64Array::from(labels)) as ArrayRef,
        ],
    )
    .expect("batch")
}

pub(crate) fn write_batches(batches: &[RecordBatch]) -> Bytes {
    let schema = batches.first().expect("at least one batch").schema();
    let mut buffer = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).expect("writer");
        for batch in batches {
            writer.write(batch).expect("write");
        }
        writer.close().expect("close");
    }
    Bytes::from(buffer)
}

pub(crate) fn trained_model() -> TrainedModel {
    let mut classifier = OpfBuilder::new()
        .with_metric("cityblock")
        .with_fallback_metric("chebyshev")
        .build()
        .expect("configuration is valid");
    classifier
        .fit(
            &[[0.0, 0.0], [1.0, 0.5], [9.0, 9.0], [10.0, 8.5], [0.5, 1.0]],
            &[3, 3, 7, 7, 3],
        )
        .expect("training succeeds");
    classifier.into_model().expect("classifier is trained")
}

pub(crate) fn model_bytes(model: &TrainedModel) -> Bytes {
    let mut buffer = Vec::new();
    crate::write_model(model, &mut buffer).expect("model encodes");
    Bytes::from(buffer)
}
