//! Labelled feature datasets loaded from Arrow record batches or Parquet.
use std::{fs::File, path::Path};

use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchReader};
use opforest_core::FeatureMatrix;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::debug;

use crate::errors::StoreError;
use crate::ingest::{
    append_fixed_size_list_values, append_optional_labels, column_index, downcast_column,
    validate_fixed_size_list_field,
};

/// Feature vectors with an optional label per row.
///
/// Rows without a label are kept so callers can decide how to treat them;
/// [`LabelledMatrix::labelled_rows`] drops them before training.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledMatrix {
    features: FeatureMatrix,
    labels: Vec<Option<i64>>,
}

/// Rows of a [`LabelledMatrix`] that carry a label.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSet {
    /// Features of the labelled rows, in source order.
    pub features: FeatureMatrix,
    /// Labels aligned with `features`.
    pub labels: Vec<i64>,
    /// Number of rows skipped because their label was null.
    pub excluded: usize,
}

impl LabelledMatrix {
    /// Pairs a feature matrix with per-row labels.
    ///
    /// # Errors
    /// Returns [`StoreError::LabelCountMismatch`] when `labels` does not
    /// have one entry per feature row.
    pub fn new(features: FeatureMatrix, labels: Vec<Option<i64>>) -> Result<Self, StoreError> {
        if labels.len() != features.rows() {
            return Err(StoreError::LabelCountMismatch {
                rows: features.rows(),
                labels: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    /// Loads the `features` column and, when named, the `labels` column from
    /// a Parquet file.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the file cannot be read, a column is
    /// missing or mistyped, or the features are empty or non-finite.
    pub fn try_from_parquet_path(
        path: impl AsRef<Path>,
        features: &str,
        labels: Option<&str>,
    ) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(file, features, labels)
    }

    /// Loads a dataset from any Parquet chunk reader.
    ///
    /// # Errors
    /// See [`LabelledMatrix::try_from_parquet_path`].
    pub fn try_from_parquet_reader<R>(
        reader: R,
        features: &str,
        labels: Option<&str>,
    ) -> Result<Self, StoreError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let wanted = std::iter::once(features).chain(labels);
        let mask = ProjectionMask::columns(builder.parquet_schema(), wanted);
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let feature_index = column_index(&schema, features)?;
        let dimension = validate_fixed_size_list_field(schema.field(feature_index), features)?;
        let label_index = labels
            .map(|column| column_index(&schema, column))
            .transpose()?;

        let mut collector = Collector::new(dimension);
        for batch in reader {
            collector.push(&batch?, feature_index, features, label_index.zip(labels))?;
        }
        collector.finish(label_index.is_some())
    }

    /// Builds a dataset from in-memory record batches.
    ///
    /// # Errors
    /// See [`LabelledMatrix::try_from_parquet_path`].
    pub fn try_from_record_batches(
        batches: &[RecordBatch],
        features: &str,
        labels: Option<&str>,
    ) -> Result<Self, StoreError> {
        let mut collector: Option<Collector> = None;
        for batch in batches {
            let schema = batch.schema();
            let feature_index = column_index(&schema, features)?;
            let width = validate_fixed_size_list_field(schema.field(feature_index), features)?;
            let label_index = labels
                .map(|column| column_index(&schema, column))
                .transpose()?;
            let current = collector.get_or_insert_with(|| Collector::new(width));
            current.push(batch, feature_index, features, label_index.zip(labels))?;
        }
        collector
            .unwrap_or_else(|| Collector::new(0))
            .finish(labels.is_some())
    }

    /// The feature matrix.
    #[must_use]
    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    /// Per-row labels; `None` marks an unlabelled row.
    #[must_use]
    pub fn labels(&self) -> &[Option<i64>] {
        &self.labels
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.features.rows()
    }

    /// Feature dimensionality.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.features.dimension()
    }

    /// Keeps only the rows that carry a label.
    ///
    /// # Errors
    /// Returns [`StoreError::NoLabelledRows`] when every label is null.
    pub fn labelled_rows(&self) -> Result<TrainingSet, StoreError> {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for (row, label) in self.features.iter_rows().zip(&self.labels) {
            if let Some(label) = label {
                values.extend_from_slice(row);
                labels.push(*label);
            }
        }
        if labels.is_empty() {
            return Err(StoreError::NoLabelledRows);
        }
        let excluded = self.labels.len() - labels.len();
        if excluded > 0 {
            debug!(excluded, kept = labels.len(), "dropped rows without labels");
        }
        let features = FeatureMatrix::try_new(labels.len(), self.dimension(), values)?;
        Ok(TrainingSet {
            features,
            labels,
            excluded,
        })
    }
}

struct Collector {
    dimension: usize,
    rows: usize,
    values: Vec<f32>,
    labels: Vec<Option<i64>>,
}

impl Collector {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: 0,
            values: Vec::new(),
            labels: Vec::new(),
        }
    }

    fn push(
        &mut self,
        batch: &RecordBatch,
        feature_index: usize,
        features: &str,
        labels: Option<(usize, &str)>,
    ) -> Result<(), StoreError> {
        let list = downcast_column::<FixedSizeListArray>(
            batch.column(feature_index),
            features,
            "FixedSizeList<Float32, _>",
        )?;
        append_fixed_size_list_values(list, Some(self.dimension), self.rows, &mut self.values)?;
        match labels {
            Some((index, column)) => {
                append_optional_labels(batch.column(index), column, &mut self.labels)?;
            }
            None => self.labels.resize(self.rows + list.len(), None),
        }
        self.rows += list.len();
        Ok(())
    }

    fn finish(self, labelled: bool) -> Result<LabelledMatrix, StoreError> {
        let features = FeatureMatrix::try_new(self.rows, self.dimension, self.values)?;
        debug!(
            rows = self.rows,
            dimension = self.dimension,
            labelled,
            "dataset loaded"
        );
        LabelledMatrix::new(features, self.labels)
    }
}
