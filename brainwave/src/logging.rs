//! Structured logging set-up.
//!
//! Call [init_logging] once at start-up. `RUST_LOG` overrides the configured
//! level. Sample values are plaintext secrets: log counts and shapes, never
//! the values themselves.

use std::{fmt, io, path::PathBuf, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt as tfmt, fmt::time::SystemTime, prelude::*};

static LOGGING_INITIALIZED: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive (trace, debug, info, warn, error, or per-target).
    pub level: String,
    pub format: LogFormat,
    /// Also append logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,

    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("failed to open log file: {0}")]
    FileCreate(#[from] io::Error),

    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Parses `level` as an [EnvFilter] directive.
pub fn parse_level(level: &str) -> Result<EnvFilter, LogError> {
    EnvFilter::try_new(level).map_err(|e| LogError::InvalidLevel(format!("{level}: {e}")))
}

/// Installs the global subscriber. Logs go to stderr so that stdout only
/// carries results.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let env_filter: EnvFilter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_level(&config.level)?,
    };

    let file = match &config.file {
        Some(path) => Some(std::fs::OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    match config.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tfmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_ansi(true),
            );
            match file {
                Some(file) => {
                    let file_layer = tfmt::layer().with_writer(file).with_target(true).with_ansi(false);
                    tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
                }
                None => tracing::subscriber::set_global_default(subscriber)?,
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tfmt::layer()
                    .json()
                    .with_timer(SystemTime)
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true),
            );
            match file {
                Some(file) => {
                    let file_layer = tfmt::layer()
                        .json()
                        .with_writer(file)
                        .with_timer(SystemTime)
                        .with_current_span(true)
                        .flatten_event(true);
                    tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
                }
                None => tracing::subscriber::set_global_default(subscriber)?,
            }
        }
    }

    let _ = LOGGING_INITIALIZED.set(true);

    tracing::info!(
        log_level = %config.level,
        log_format = %config.format,
        log_file = ?config.file,
        "logging initialized"
    );
    Ok(())
}
