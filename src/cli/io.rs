//! JSON output for the CLI
//!
//! - One JSON object per invocation on stdout
//! - `{"status":"ok","data":...}` on success
//! - `{"status":"error","code":...,"message":...}` on failure

use std::io::{self, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(&response)
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response).map_err(|e| CliError::io_error(e.to_string()))?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
