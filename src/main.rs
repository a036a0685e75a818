//! tabripp - download Songsterr tabs and derive drum MIDI files.

use std::process::ExitCode;

use clap::Parser;
use tabripp::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tabripp=info".parse()?))
        .init();

    if cli::run_command(&args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
