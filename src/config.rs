//! Configuration module for cgi-echo.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values. With neither,
//! the program echoes with no limits.
//!
//! When `GATEWAY_INTERFACE` is set the program is running under a web
//! server, which may fill argv from the client's query string, so argv
//! is ignored and the config file can only be named through
//! `CGI_ECHO_CONFIG`. Loading never fails: problems are reported back
//! to the caller and the affected source falls back to defaults.

use clap::error::ErrorKind;
use clap::Parser;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::cgi::{CgiEnv, HandlerOptions};

/// Environment variable naming the TOML configuration file.
pub const CONFIG_ENV: &str = "CGI_ECHO_CONFIG";

/// Command-line arguments for the echo program
#[derive(Parser, Debug, Default)]
#[command(name = "cgi-echo")]
#[command(author = "cgi-echo authors")]
#[command(version = "0.1.0")]
#[command(about = "A CGI program that echoes the request body", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Largest body to echo in bytes, regardless of CONTENT_LENGTH
    #[arg(long)]
    pub max_content_length: Option<u64>,

    /// Seconds to wait for the request body before echoing what arrived
    #[arg(long)]
    pub read_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error) [default: warn]
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request body limits
#[derive(Debug, Deserialize, Default)]
pub struct RequestConfig {
    /// Largest body to echo in bytes
    pub max_content_length: Option<u64>,
    /// Body read timeout in seconds
    pub read_timeout: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level
    pub level: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_content_length: Option<u64>,
    pub read_timeout: Option<Duration>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::merge(CliArgs::default(), TomlConfig::default())
    }
}

impl Config {
    /// Load configuration from the process arguments and `env`.
    ///
    /// Returns the configuration together with any errors met while
    /// loading it; logging is not set up yet, so the caller reports them.
    pub fn load(env: &CgiEnv) -> (Self, Vec<ConfigError>) {
        Self::from_sources(std::env::args_os(), env)
    }

    /// Resolve configuration from explicit arguments and environment.
    pub fn from_sources<I, T>(args: I, env: &CgiEnv) -> (Self, Vec<ConfigError>)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut errors = Vec::new();

        let cli = if env.gateway_interface().is_some() {
            CliArgs::default()
        } else {
            match CliArgs::try_parse_from(args) {
                Ok(cli) => cli,
                Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                    e.exit()
                }
                Err(e) => {
                    errors.push(ConfigError::Args(e));
                    CliArgs::default()
                }
            }
        };

        let config_path = cli.config.clone().or_else(|| {
            env.get(CONFIG_ENV)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
        });

        let toml_config = match config_path {
            Some(path) => match read_toml(path) {
                Ok(toml_config) => toml_config,
                Err(e) => {
                    errors.push(e);
                    TomlConfig::default()
                }
            },
            None => TomlConfig::default(),
        };

        (Self::merge(cli, toml_config), errors)
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        Config {
            max_content_length: cli
                .max_content_length
                .or(toml_config.request.max_content_length),
            read_timeout: cli
                .read_timeout
                .or(toml_config.request.read_timeout)
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            log_level: cli
                .log_level
                .or(toml_config.logging.level)
                .unwrap_or_else(default_log_level),
        }
    }

    /// Body read limits for the echo handler.
    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            max_content_length: self.max_content_length,
            read_timeout: self.read_timeout,
        }
    }
}

fn read_toml(path: PathBuf) -> Result<TomlConfig, ConfigError> {
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => return Err(ConfigError::FileRead(path, e)),
    };
    toml::from_str(&contents).map_err(|e| ConfigError::TomlParse(path, e))
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Args(clap::Error),
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Args(e) => {
                write!(f, "Invalid command-line arguments: {}", e.to_string().trim_end())
            }
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
