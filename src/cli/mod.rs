//! Command-line interface for tabripp.
//!
//! Starts download jobs, relays their progress to the terminal, and lists
//! downloaded files.

mod commands;

pub use commands::{Cli, Commands, run_command};
