//! CLI argument definitions using clap
//!
//! Commands:
//! - stowage --dir <path> put <key> <json>
//! - stowage --dir <path> get <key>
//! - stowage --dir <path> delete <key>
//! - stowage --dir <path> keys
//! - stowage --dir <path> count
//! - stowage --dir <path> clear
//!
//! `--config <file>` may replace or complement `--dir`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// stowage - inspect and edit a crash-safe key-value store directory
#[derive(Parser, Debug)]
#[command(name = "stowage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Parent directory of the store
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Store directory name under --dir
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a JSON value under a key
    Put {
        key: String,
        /// Value as JSON text
        value: String,
    },

    /// Print the value stored under a key
    Get { key: String },

    /// Remove a key
    Delete { key: String },

    /// List stored keys
    Keys,

    /// Print the number of stored keys
    Count,

    /// Remove every key
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
