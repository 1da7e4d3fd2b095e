//! `opforest` binary: `fit` trains an optimum-path forest from a labelled
//! Parquet file and saves the model; `classify` loads a model and prints one
//! `index\tlabel\tcost` line per input row.
//!
//! Results go to stdout. Diagnostics, including the stable error code and
//! error kind of a failed command, go to stderr through `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use opforest_cli::{
    cli::{Cli, CliError, Command, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn command_name(cli: &Cli) -> &'static str {
    match cli.command {
        Command::Fit(_) => "fit",
        Command::Classify(_) => "classify",
    }
}

fn execute(cli: Cli) -> Result<()> {
    let name = command_name(&cli);
    let summary = run_cli(cli).with_context(|| format!("`opforest {name}` failed"))?;
    let mut stdout = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut stdout).context("failed to write results to stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

fn report_failure(err: &anyhow::Error) -> ExitCode {
    let cli_error = err.downcast_ref::<CliError>();
    let code = cli_error.map(|e| field::display(e.code()));
    let kind = cli_error.and_then(CliError::kind).map(field::debug);
    let message = format!("{err:#}");
    error!(error = %message, code, kind, "opforest command failed");
    ExitCode::from(cli_error.map_or(1, CliError::exit_status))
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
