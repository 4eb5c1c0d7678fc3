//! Tooling & Integration Layer
//!
//! Operator-facing entry points over the activation core. Hosts embed the
//! library and register factories; the CLI wraps the same surface for
//! inspection and preflight from a shell.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
