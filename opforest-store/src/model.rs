//! Parquet persistence for trained models.
//!
//! A model is one row group of six non-nullable columns: `features`
//! (`FixedSizeList<Float32, d>`), `label` and `assigned` (`Int64`), `cost`
//! (`Float32`), `parent` (`UInt64`) and `prototype` (`Boolean`). The metric
//! selection and sentinel live in the Arrow schema metadata under the
//! `opforest.` prefix.
use std::{collections::HashMap, fs::File, io::Write, path::Path, sync::Arc};

use arrow_array::{
    Array, ArrayRef, BooleanArray, FixedSizeListArray, Float32Array, Int64Array, RecordBatch,
    UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use opforest_core::{FeatureMatrix, MetricSelection, ModelParts, TrainedModel};
use parquet::arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::{debug, instrument};

use crate::errors::StoreError;
use crate::ingest::{
    append_fixed_size_list_values, column_index, downcast_column, fixed_size_list_field,
    validate_fixed_size_list_field, validate_scalar_field,
};

/// Version written to [`FORMAT_VERSION_KEY`]; readers reject anything else.
pub const FORMAT_VERSION: &str = "1";
/// Metadata key holding the model format version.
pub const FORMAT_VERSION_KEY: &str = "opforest.format_version";
/// Metadata key holding the primary metric name.
pub const METRIC_KEY: &str = "opforest.metric";
/// Metadata key holding the optional fallback metric name.
pub const FALLBACK_METRIC_KEY: &str = "opforest.fallback_metric";
/// Metadata key holding the unknown-label sentinel.
pub const UNKNOWN_LABEL_KEY: &str = "opforest.unknown_label";
/// Metadata key holding the sentinel margin.
pub const SENTINEL_MARGIN_KEY: &str = "opforest.sentinel_margin";

const FEATURES: &str = "features";
const LABEL: &str = "label";
const ASSIGNED: &str = "assigned";
const COST: &str = "cost";
const PARENT: &str = "parent";
const PROTOTYPE: &str = "prototype";

const SCALAR_COLUMNS: [(&str, DataType, &str); 5] = [
    (LABEL, DataType::Int64, "Int64"),
    (ASSIGNED, DataType::Int64, "Int64"),
    (COST, DataType::Float32, "Float32"),
    (PARENT, DataType::UInt64, "UInt64"),
    (PROTOTYPE, DataType::Boolean, "Boolean"),
];

/// Writes `model` as Parquet to `path`, replacing any existing file.
///
/// # Errors
/// Returns [`StoreError`] when the file cannot be created or encoding fails.
pub fn save_model(model: &TrainedModel, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let file = File::create(path)?;
    write_model(model, file)
}

/// Writes `model` as Parquet to `writer`.
///
/// # Errors
/// Returns [`StoreError`] when Arrow or Parquet encoding fails.
#[instrument(skip_all, fields(samples = model.len(), dimension = model.dimension()))]
pub fn write_model<W: Write + Send>(model: &TrainedModel, writer: W) -> Result<(), StoreError> {
    let batch = model_batch(model)?;
    let mut writer = ArrowWriter::try_new(writer, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    debug!(prototypes = model.prototypes().len(), "model written");
    Ok(())
}

/// Reads a model previously written by [`save_model`].
///
/// # Errors
/// Returns [`StoreError`] when the file cannot be read, the schema or
/// metadata is malformed, or the stored arrays violate a model invariant.
pub fn load_model(path: impl AsRef<Path>) -> Result<TrainedModel, StoreError> {
    let file = File::open(path)?;
    read_model(file)
}

/// Reads a model from any Parquet chunk reader.
///
/// # Errors
/// See [`load_model`].
pub fn read_model<R>(reader: R) -> Result<TrainedModel, StoreError>
where
    R: ChunkReader + Send + 'static,
{
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = Arc::clone(builder.schema());
    let header = ModelHeader::from_metadata(schema.metadata())?;
    let dimension = validate_schema(&schema)?;

    let mut columns = ModelColumns::default();
    for batch in builder.build()? {
        columns.push(&batch?, dimension)?;
    }
    let rows = columns.labels.len();
    let parts = ModelParts {
        features: FeatureMatrix::try_new(rows, dimension, columns.features)?,
        labels: columns.labels,
        assigned: columns.assigned,
        cost: columns.cost,
        parent: columns.parent,
        prototypes: columns.prototypes,
        unknown_label: header.unknown_label,
        sentinel_margin: header.sentinel_margin,
        metric: header.metric,
    };
    let model = TrainedModel::from_parts(parts)?;
    debug!(
        samples = model.len(),
        prototypes = model.prototypes().len(),
        "model loaded"
    );
    Ok(model)
}

pub(crate) fn model_batch(model: &TrainedModel) -> Result<RecordBatch, StoreError> {
    let dimension = i32::try_from(model.dimension()).map_err(|_| StoreError::CapacityOverflow {
        rows: model.len(),
        dimension: model.dimension(),
    })?;
    let features = FixedSizeListArray::try_new(
        Arc::new(Field::new("item", DataType::Float32, false)),
        dimension,
        Arc::new(Float32Array::from(model.features().as_slice().to_vec())),
        None,
    )?;
    let parent = model
        .parent()
        .iter()
        .enumerate()
        .map(|(row, &parent)| {
            u64::try_from(parent).map_err(|_| StoreError::IndexOutOfRange {
                column: PARENT,
                row,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut prototype = vec![false; model.len()];
    for &node in model.prototypes() {
        if let Some(flag) = prototype.get_mut(node) {
            *flag = true;
        }
    }

    let mut fields = vec![fixed_size_list_field(FEATURES, dimension)];
    fields.extend(
        SCALAR_COLUMNS
            .iter()
            .map(|(name, data_type, _)| Field::new(*name, data_type.clone(), false)),
    );
    let schema = Schema::new_with_metadata(fields, header_metadata(model));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(features),
        Arc::new(Int64Array::from(model.labels().to_vec())),
        Arc::new(Int64Array::from(model.assigned().to_vec())),
        Arc::new(Float32Array::from(model.cost().to_vec())),
        Arc::new(UInt64Array::from(parent)),
        Arc::new(BooleanArray::from(prototype)),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

fn header_metadata(model: &TrainedModel) -> HashMap<String, String> {
    let mut metadata = HashMap::from([
        (FORMAT_VERSION_KEY.to_owned(), FORMAT_VERSION.to_owned()),
        (METRIC_KEY.to_owned(), model.metric().primary.clone()),
        (
            UNKNOWN_LABEL_KEY.to_owned(),
            model.universe().unknown().to_string(),
        ),
        (
            SENTINEL_MARGIN_KEY.to_owned(),
            model.universe().margin().to_string(),
        ),
    ]);
    if let Some(fallback) = &model.metric().fallback {
        metadata.insert(FALLBACK_METRIC_KEY.to_owned(), fallback.clone());
    }
    metadata
}

struct ModelHeader {
    metric: MetricSelection,
    unknown_label: i64,
    sentinel_margin: i64,
}

impl ModelHeader {
    fn from_metadata(metadata: &HashMap<String, String>) -> Result<Self, StoreError> {
        let version = required(metadata, FORMAT_VERSION_KEY)?;
        if version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedFormatVersion {
                found: version.to_owned(),
            });
        }
        Ok(Self {
            metric: MetricSelection {
                primary: required(metadata, METRIC_KEY)?.to_owned(),
                fallback: metadata.get(FALLBACK_METRIC_KEY).cloned(),
            },
            unknown_label: parse_i64(metadata, UNKNOWN_LABEL_KEY)?,
            sentinel_margin: parse_i64(metadata, SENTINEL_MARGIN_KEY)?,
        })
    }
}

fn required<'a>(
    metadata: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, StoreError> {
    metadata
        .get(key)
        .map(String::as_str)
        .ok_or(StoreError::MissingMetadata { key })
}

fn parse_i64(metadata: &HashMap<String, String>, key: &'static str) -> Result<i64, StoreError> {
    let raw = required(metadata, key)?;
    raw.trim()
        .parse()
        .map_err(|_| StoreError::InvalidMetadata {
            key,
            value: raw.to_owned(),
        })
}

fn validate_schema(schema: &Schema) -> Result<usize, StoreError> {
    let dimension = validate_fixed_size_list_field(
        schema.field(column_index(schema, FEATURES)?),
        FEATURES,
    )?;
    for (name, data_type, description) in &SCALAR_COLUMNS {
        let field = schema.field(column_index(schema, name)?);
        validate_scalar_field(field, name, data_type, *description)?;
    }
    Ok(dimension)
}

#[derive(Default)]
struct ModelColumns {
    features: Vec<f32>,
    labels: Vec<i64>,
    assigned: Vec<i64>,
    cost: Vec<f32>,
    parent: Vec<usize>,
    prototypes: Vec<usize>,
}

impl ModelColumns {
    fn push(&mut self, batch: &RecordBatch, dimension: usize) -> Result<(), StoreError> {
        let start_row = self.labels.len();

        let features = downcast_column::<FixedSizeListArray>(
            column(batch, FEATURES)?,
            FEATURES,
            "FixedSizeList<Float32, _>",
        )?;
        append_fixed_size_list_values(features, Some(dimension), start_row, &mut self.features)?;

        let labels = downcast_column::<Int64Array>(column(batch, LABEL)?, LABEL, "Int64")?;
        require_no_nulls(labels, LABEL, start_row)?;
        self.labels.extend_from_slice(labels.values());

        let assigned =
            downcast_column::<Int64Array>(column(batch, ASSIGNED)?, ASSIGNED, "Int64")?;
        require_no_nulls(assigned, ASSIGNED, start_row)?;
        self.assigned.extend_from_slice(assigned.values());

        let cost = downcast_column::<Float32Array>(column(batch, COST)?, COST, "Float32")?;
        require_no_nulls(cost, COST, start_row)?;
        self.cost.extend_from_slice(cost.values());

        let parent =
            downcast_column::<UInt64Array>(column(batch, PARENT)?, PARENT, "UInt64")?;
        require_no_nulls(parent, PARENT, start_row)?;
        for (offset, &value) in parent.values().iter().enumerate() {
            let index = usize::try_from(value).map_err(|_| StoreError::IndexOutOfRange {
                column: PARENT,
                row: start_row + offset,
            })?;
            self.parent.push(index);
        }

        let prototype =
            downcast_column::<BooleanArray>(column(batch, PROTOTYPE)?, PROTOTYPE, "Boolean")?;
        require_no_nulls(prototype, PROTOTYPE, start_row)?;
        self.prototypes.extend(
            prototype
                .values()
                .iter()
                .enumerate()
                .filter_map(|(offset, flag)| flag.then_some(start_row + offset)),
        );
        Ok(())
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, StoreError> {
    Ok(batch.column(column_index(&batch.schema(), name)?))
}

fn require_no_nulls(array: &dyn Array, column: &str, start_row: usize) -> Result<(), StoreError> {
    match (0..array.len()).find(|&row| array.is_null(row)) {
        Some(row) => Err(StoreError::NullRow {
            column: column.to_owned(),
            row: start_row + row,
        }),
        None => Ok(()),
    }
}
