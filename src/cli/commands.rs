//! Command execution
//!
//! Each invocation assembles one [`Stowage`] over the configured directory,
//! runs a single operation on a current-thread runtime and prints one JSON
//! response.

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::config::StowageConfig;
use crate::engine::Stowage;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "STOWAGE_LOG";

/// Parse arguments, run the command and print its response
pub fn run() -> CliResult<()> {
    init_logging();
    let cli = Cli::parse_args();
    let config = resolve_config(&cli)?;
    let data = run_command(&config, cli.command)?;
    write_response(data)
}

/// Log to stderr, filtered by `STOWAGE_LOG` (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Merge `--config` with `--dir`/`--name`; the flags win
pub fn resolve_config(cli: &Cli) -> CliResult<StowageConfig> {
    let mut config = match (&cli.config, &cli.dir) {
        (Some(path), _) => StowageConfig::load(path)?,
        (None, Some(dir)) => StowageConfig::new(dir),
        (None, None) => return Err(CliError::usage("either --dir or --config is required")),
    };
    if let (Some(_), Some(dir)) = (&cli.config, &cli.dir) {
        config.base_dir = dir.clone();
    }
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Run one command against the configured store, returning the response data
pub fn run_command(config: &StowageConfig, command: Command) -> CliResult<Value> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let stowage = config.open()?;
    runtime.block_on(execute(&stowage, command))
}

async fn execute(stowage: &Stowage, command: Command) -> CliResult<Value> {
    match command {
        Command::Put { key, value } => {
            let value: Value = serde_json::from_str(&value)?;
            stowage.put(key.as_str(), value).await?;
            Ok(json!({ "key": key }))
        }
        Command::Get { key } => {
            let value = stowage.get::<Value>(key.as_str()).await?;
            Ok(json!({
                "key": key,
                "present": value.is_some(),
                "value": value.unwrap_or(Value::Null),
            }))
        }
        Command::Delete { key } => {
            stowage.delete(key.as_str()).await?;
            Ok(json!({ "key": key }))
        }
        Command::Keys => {
            let keys = stowage.keys().await?;
            Ok(json!(keys))
        }
        Command::Count => {
            let count = stowage.count().await?;
            Ok(json!(count))
        }
        Command::Clear => {
            let cleared = stowage.count().await?;
            stowage.delete_all().await?;
            Ok(json!({ "cleared": cleared }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        use clap::Parser;
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_dir_required_without_config() {
        let err = resolve_config(&cli(&["stowage", "keys"])).unwrap_err();
        assert_eq!(err.code_str(), "STOWAGE_CLI_USAGE_ERROR");
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stowage.json");
        std::fs::write(&path, r#"{"base_dir": "/from/file", "name": "file", "transform": "base64"}"#).unwrap();

        let path_arg = path.to_str().unwrap();
        let config = resolve_config(&cli(&["stowage", "--config", path_arg, "--name", "flag", "count"])).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/from/file"));
        assert_eq!(config.name, "flag");

        let config = resolve_config(&cli(&["stowage", "--config", path_arg, "--dir", "/from/flag", "count"])).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/from/flag"));
        assert_eq!(config.name, "file");
    }

    #[test]
    fn test_commands_against_directory() {
        let temp = TempDir::new().unwrap();
        let config = StowageConfig::new(temp.path());

        let put = Command::Put {
            key: "theme".into(),
            value: r#"{"dark":true}"#.into(),
        };
        assert_eq!(run_command(&config, put).unwrap(), json!({ "key": "theme" }));

        let got = run_command(&config, Command::Get { key: "theme".into() }).unwrap();
        assert_eq!(
            got,
            json!({ "key": "theme", "present": true, "value": { "dark": true } })
        );

        assert_eq!(run_command(&config, Command::Keys).unwrap(), json!(["theme"]));
        assert_eq!(run_command(&config, Command::Count).unwrap(), json!(1));
        assert_eq!(run_command(&config, Command::Clear).unwrap(), json!({ "cleared": 1 }));

        let missing = run_command(&config, Command::Get { key: "theme".into() }).unwrap();
        assert_eq!(missing["present"], json!(false));
    }

    #[test]
    fn test_malformed_value_is_usage_error() {
        let temp = TempDir::new().unwrap();
        let config = StowageConfig::new(temp.path());
        let err = run_command(
            &config,
            Command::Put {
                key: "k".into(),
                value: "{oops".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err.code_str(), "STOWAGE_CLI_USAGE_ERROR");
    }
}
