//! CLI-specific error types
//!
//! Every failure is reported once, as a JSON error object on stdout, and
//! ends the process with exit code 1.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::engine::StowageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Neither --dir nor --config given, or a malformed argument
    Usage,
    /// stdout could not be written or the runtime could not start
    Io,
    /// Configuration rejected; carries the configuration error code
    Config(&'static str),
    /// Store operation failed; carries the operation error code
    Operation(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usage => "STOWAGE_CLI_USAGE_ERROR",
            Self::Io => "STOWAGE_CLI_IO_ERROR",
            Self::Config(code) | Self::Operation(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Usage, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Io, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::Config(e.code()), e.to_string())
    }
}

impl From<StowageError> for CliError {
    fn from(e: StowageError) -> Self {
        Self::new(CliErrorCode::Operation(e.code()), e.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::usage(format!("invalid JSON: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
