//! Command-line interface for training and querying opforest models.
//!
//! `fit` trains on a labelled Parquet file and saves the model as Parquet;
//! `classify` loads a model and labels every row of another Parquet file.

mod commands;

pub use commands::{
    ClassifyCommand, Cli, CliError, Command, ExecutionSummary, FitCommand, FitSummary,
    render_summary, run_cli,
};

#[cfg(test)]
mod test_fixtures;
