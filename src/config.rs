//! Configuration module for the quizd server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Command-line arguments for the quiz server
#[derive(Parser, Debug)]
#[command(name = "quizd")]
#[command(author = "quizd authors")]
#[command(version = "0.1.0")]
#[command(about = "A multi-session interactive quiz server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 0.0.0.0:3030)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Catalog file to persist quizzes to (in-memory catalog if omitted)
    #[arg(short = 'd', long)]
    pub data_file: Option<PathBuf>,

    /// Assume clients echo server-sent prefill text into their line editor
    /// (enables edit's pre-filled prompts)
    #[arg(long)]
    pub echo_prefill: bool,

    /// Disable ANSI color in session output
    #[arg(long)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Whether connecting clients support line-editing echo of prefills
    #[serde(default)]
    pub echo_prefill: bool,
    /// Whether session output carries ANSI color
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            echo_prefill: false,
            color: default_color(),
        }
    }
}

/// Catalog storage configuration
#[derive(Debug, Deserialize, Default)]
pub struct StoreConfig {
    /// Catalog file path; no persistence when absent
    pub data_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:3030".to_string()
}

fn default_color() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub data_file: Option<PathBuf>,
    pub echo_prefill: bool,
    pub color: bool,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::merge(CliArgs::parse())
    }

    fn merge(cli: CliArgs) -> Result<Self, ConfigError> {
        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        // Merge CLI args with TOML config (CLI takes precedence)
        Ok(Config {
            listen: cli.listen.unwrap_or(toml_config.server.listen),
            data_file: cli.data_file.or(toml_config.store.data_file),
            echo_prefill: cli.echo_prefill || toml_config.server.echo_prefill,
            color: !cli.no_color && toml_config.server.color,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    TomlParse(PathBuf, #[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.server.listen, "0.0.0.0:3030");
        assert!(config.server.color);
        assert!(!config.server.echo_prefill);
        assert!(config.store.data_file.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen = "127.0.0.1:4000"
            echo_prefill = true
            color = false

            [store]
            data_file = "quizzes.json"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:4000");
        assert!(config.server.echo_prefill);
        assert!(!config.server.color);
        assert_eq!(config.store.data_file, Some(PathBuf::from("quizzes.json")));
        assert_eq!(config.logging.level, "debug");
    }
}
