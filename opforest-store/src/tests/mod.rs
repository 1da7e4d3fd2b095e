pub(crate) use super::{LabelledMatrix, StoreError};

mod ingest;
mod model;
mod support;
