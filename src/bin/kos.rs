//! kOS CLI Binary
//!
//! Command-line interface for the kOS agent activation runtime. Runs with an
//! empty factory registry; embedding hosts register implementations through
//! the library API.

use clap::Parser;
use kos::logging::{self, LoggingConfig};
use kos::tooling::cli::{Cli, CliContext};
use kos::ModuleRegistry;
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut log_config = LoggingConfig::default();
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        log_config.format = format.clone();
    }
    logging::init(&log_config);

    let context = CliContext::new(
        cli.config.clone(),
        cli.user_config.clone(),
        cli.manifest.clone(),
        ModuleRegistry::new(),
    );

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
