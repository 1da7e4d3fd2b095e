//! Parquet fixtures for CLI tests.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;

/// Writes `rows` as a `features: FixedSizeList<Float32, 2>` column and, when
/// given, `labels` as a nullable `label: Int64` column.
pub(super) fn write_dataset(
    dir: &TempDir,
    name: &str,
    rows: &[[f32; 2]],
    labels: Option<Vec<Option<i64>>>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let mut fields = vec![Field::new(
        "features",
        DataType::FixedSizeList(Arc::clone(&item_field), 2),
        false,
    )];
    let values = Float32Array::from_iter_values(rows.iter().flatten().copied());
    let mut columns: Vec<ArrayRef> = vec![Arc::new(FixedSizeListArray::try_new(
        item_field,
        2,
        Arc::new(values),
        None,
    )?)];
    if let Some(labels) = labels {
        fields.push(Field::new("label", DataType::Int64, true));
        columns.push(Arc::new(Int64Array::from(labels)));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;
    let path = dir.path().join(name);
    let mut writer = ArrowWriter::try_new(File::create(&path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}

/// Two well-separated groups with one unlabelled row between them.
pub(super) fn training_rows() -> (Vec<[f32; 2]>, Vec<Option<i64>>) {
    (
        vec![
            [0.0, 0.0],
            [0.5, 0.2],
            [5.0, 5.0],
            [9.8, 10.0],
            [10.0, 9.5],
        ],
        vec![Some(1), Some(1), None, Some(2), Some(2)],
    )
}
