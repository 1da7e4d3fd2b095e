//! Arrow and Parquet storage for opforest: labelled dataset ingestion and
//! trained-model persistence.

mod dataset;
mod errors;
mod ingest;
mod model;

pub use dataset::{LabelledMatrix, TrainingSet};
pub use errors::StoreError;
pub use model::{
    FALLBACK_METRIC_KEY, FORMAT_VERSION, FORMAT_VERSION_KEY, METRIC_KEY, SENTINEL_MARGIN_KEY,
    UNKNOWN_LABEL_KEY, load_model, read_model, save_model, write_model,
};

#[cfg(test)]
mod tests;
