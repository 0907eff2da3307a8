//! stowage CLI entry point
//!
//! Parses arguments and delegates to [`stowage::cli::run`]. Failures are
//! reported as a JSON error object on stdout with exit code 1.

use stowage::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::write_error(e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
