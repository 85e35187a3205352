//! Tracing subscriber setup with format selection.
//!
//! Logs go to stderr so command output on stdout stays pipeable.

use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "FLOWMGR_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable multi-line format with colors.
    Pretty,
    /// Compact single-line format.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        })
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive string.
    pub filter: String,
}

impl LoggingConfig {
    /// Resolve settings from `-v` count and the process environment.
    pub fn from_env(verbosity: u8) -> Self {
        Self::resolve(
            verbosity,
            std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
            io::stderr().is_terminal(),
        )
    }

    /// Resolve settings from explicit inputs.
    ///
    /// `RUST_LOG` wins over the verbosity flag. Without an explicit format,
    /// terminals get the pretty format and everything else the compact one.
    pub fn resolve(
        verbosity: u8,
        format: Option<&str>,
        rust_log: Option<&str>,
        is_terminal: bool,
    ) -> Self {
        let format = format
            .and_then(|f| f.parse::<LogFormat>().ok())
            .unwrap_or(if is_terminal {
                LogFormat::Pretty
            } else {
                LogFormat::Compact
            });

        let filter = match rust_log.filter(|f| !f.trim().is_empty()) {
            Some(filter) => filter.to_string(),
            None => verbosity_filter(verbosity).to_string(),
        };

        Self { format, filter }
    }
}

fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(io::stderr).with_target(true))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr).with_target(true))
            .try_init(),
    }
    .context("Failed to initialize tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        let levels: Vec<String> = (0..5)
            .map(|v| LoggingConfig::resolve(v, None, None, false).filter)
            .collect();
        assert_eq!(levels, ["warn", "info", "debug", "trace", "trace"]);
    }

    #[test]
    fn rust_log_overrides_verbosity() {
        let config = LoggingConfig::resolve(2, None, Some("flowmgr_client=trace"), false);
        assert_eq!(config.filter, "flowmgr_client=trace");

        let config = LoggingConfig::resolve(1, None, Some("  "), false);
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn format_defaults_follow_terminal() {
        assert_eq!(
            LoggingConfig::resolve(0, None, None, true).format,
            LogFormat::Pretty
        );
        assert_eq!(
            LoggingConfig::resolve(0, None, None, false).format,
            LogFormat::Compact
        );
        assert_eq!(
            LoggingConfig::resolve(0, Some("JSON"), None, true).format,
            LogFormat::Json
        );
    }
}
