//! Support library for the opforest CLI binary.
//!
//! Exposes argument parsing, command execution and logging setup so tests can
//! drive the `fit` and `classify` commands without spawning a subprocess.

pub mod cli;
pub mod logging;
