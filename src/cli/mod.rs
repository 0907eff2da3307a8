//! CLI module for stowage
//!
//! One operation per invocation against a store directory:
//! - put / get / delete: single-key operations
//! - keys / count: enumeration
//! - clear: remove every entry

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{resolve_config, run, run_command, LOG_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
