//! CLI module for inspectdb
//!
//! Provides command-line interface for:
//! - init: Create the data directory and write the built-in schemas
//! - validate: Check one document against its collection schema
//! - insert: Validate and persist documents, one per line
//! - query: Run one predefined query and print its rows

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, QueryShape};
pub use commands::{init, insert, is_initialized, query, run, run_command, validate};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
