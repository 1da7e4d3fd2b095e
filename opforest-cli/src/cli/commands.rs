//! Command implementations and argument parsing for the opforest CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use opforest_core::{
    DEFAULT_SENTINEL_MARGIN, ErrorKind, OpfBuilder, OpfClassifier, OpfError, Prediction,
};
use opforest_store::{LabelledMatrix, StoreError, load_model, save_model};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "opforest",
    about = "Train and query optimum-path forest classifiers."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Train a classifier on a labelled Parquet file and save the model.
    Fit(FitCommand),
    /// Classify the rows of a Parquet file with a saved model.
    Classify(ClassifyCommand),
}

/// Options accepted by the `fit` command.
#[derive(Debug, Args, Clone)]
pub struct FitCommand {
    /// Parquet file holding the training samples.
    pub path: PathBuf,

    /// Column containing `FixedSizeList<Float32, D>` feature rows.
    #[arg(long, default_value = "features")]
    pub features: String,

    /// `Int64` or `Int32` column holding class labels; null rows are skipped.
    #[arg(long, default_value = "label")]
    pub labels: String,

    /// Where to write the trained model.
    #[arg(long)]
    pub model: PathBuf,

    /// Primary distance metric.
    #[arg(long, default_value = "euclidean")]
    pub metric: String,

    /// Metric tried when the primary metric fails.
    #[arg(long)]
    pub fallback_metric: Option<String>,

    /// Distance between the smallest label and the unknown-label sentinel.
    #[arg(long, default_value_t = DEFAULT_SENTINEL_MARGIN)]
    pub sentinel_margin: i64,
}

/// Options accepted by the `classify` command.
#[derive(Debug, Args, Clone)]
pub struct ClassifyCommand {
    /// Model written by `fit`.
    pub model: PathBuf,

    /// Parquet file holding the samples to classify.
    pub path: PathBuf,

    /// Column containing `FixedSizeList<Float32, D>` feature rows.
    #[arg(long, default_value = "features")]
    pub features: String,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading a dataset or reading/writing a model failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Training or classification failed.
    #[error(transparent)]
    Core(#[from] OpfError),
}

impl CliError {
    /// Stable machine-readable code of the underlying failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(error) => error.code(),
            Self::Core(error) => error.code().as_str(),
        }
    }

    /// Classification of the underlying classifier error, if there is one.
    /// Model files that fail validation report the kind of the model error.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Core(error) | Self::Store(StoreError::Model(error)) => Some(error.kind()),
            Self::Store(_) => None,
        }
    }

    /// Process exit status: `2` for invalid input or configuration, `3` when
    /// every metric tier failed, `1` for I/O, storage and internal failures.
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        match self.kind() {
            Some(ErrorKind::Precondition) => 2,
            Some(ErrorKind::Metric) => 3,
            Some(ErrorKind::Fatal) | None => 1,
        }
    }
}

/// Outcome of `fit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitSummary {
    /// Where the model was written.
    pub model: PathBuf,
    /// Labelled samples used for training.
    pub samples: usize,
    /// Rows skipped because their label was null.
    pub excluded: usize,
    /// Number of prototypes selected.
    pub prototypes: usize,
    /// Number of distinct classes.
    pub classes: usize,
}

/// Outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// A model was trained and saved.
    Fit(FitSummary),
    /// One prediction per input row, in input order.
    Classify(Vec<Prediction>),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, training, classification or saving
/// fails.
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Fit(fit) => {
            span.record("command", field::display("fit"));
            run_fit(fit).map(ExecutionSummary::Fit)
        }
        Command::Classify(classify) => {
            span.record("command", field::display("classify"));
            run_classify(&classify).map(ExecutionSummary::Classify)
        }
    }
}

#[instrument(
    name = "cli.fit",
    err,
    skip(command),
    fields(path = %command.path.display(), metric = %command.metric),
)]
pub(super) fn run_fit(command: FitCommand) -> Result<FitSummary, CliError> {
    let FitCommand {
        path,
        features,
        labels,
        model,
        metric,
        fallback_metric,
        sentinel_margin,
    } = command;
    let dataset =
        LabelledMatrix::try_from_parquet_path(&path, &features, Some(labels.as_str()))?;
    let training = dataset.labelled_rows()?;
    if training.excluded > 0 {
        warn!(
            excluded = training.excluded,
            "rows without a label were excluded from training"
        );
    }

    let mut builder = OpfBuilder::new()
        .with_metric(metric)
        .with_sentinel_margin(sentinel_margin);
    if let Some(fallback) = fallback_metric {
        builder = builder.with_fallback_metric(fallback);
    }
    let mut classifier = builder.build()?;
    classifier.fit_matrix(training.features, &training.labels)?;
    let trained = classifier.into_model().ok_or(OpfError::NotTrained)?;
    save_model(&trained, &model)?;

    let summary = FitSummary {
        model,
        samples: trained.len(),
        excluded: training.excluded,
        prototypes: trained.prototypes().len(),
        classes: trained.universe().class_count(),
    };
    info!(
        model = %summary.model.display(),
        samples = summary.samples,
        prototypes = summary.prototypes,
        "model saved"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.classify",
    err,
    skip(command),
    fields(model = %command.model.display(), path = %command.path.display()),
)]
pub(super) fn run_classify(command: &ClassifyCommand) -> Result<Vec<Prediction>, CliError> {
    let model = load_model(&command.model)?;
    let classifier = OpfClassifier::from_model(OpfBuilder::new(), model)?;
    let dataset = LabelledMatrix::try_from_parquet_path(&command.path, &command.features, None)?;
    let predictions = classifier.classify_matrix(dataset.features())?;
    info!(rows = predictions.len(), "classification completed");
    Ok(predictions)
}

/// Renders `summary` to `writer`.
///
/// `fit` prints `key: value` lines; `classify` prints one
/// `index\tlabel\tcost` line per input row.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// use opforest_cli::cli::{ExecutionSummary, render_summary};
/// use opforest_core::Prediction;
///
/// let summary = ExecutionSummary::Classify(vec![
///     Prediction { label: 4, cost: 0.5, node: 0 },
///     Prediction { label: 9, cost: 2.0, node: 3 },
/// ]);
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "0\t4\t0.5\n1\t9\t2\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Fit(fit) => {
            writeln!(writer, "model: {}", fit.model.display())?;
            writeln!(writer, "samples: {}", fit.samples)?;
            writeln!(writer, "excluded: {}", fit.excluded)?;
            writeln!(writer, "prototypes: {}", fit.prototypes)?;
            writeln!(writer, "classes: {}", fit.classes)?;
        }
        ExecutionSummary::Classify(predictions) => {
            for (index, prediction) in predictions.iter().enumerate() {
                writeln!(writer, "{index}\t{}\t{}", prediction.label, prediction.cost)?;
            }
        }
    }
    Ok(())
}
