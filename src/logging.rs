//! Logging System
//!
//! Structured logging via the `tracing` crate: configurable level, text or
//! JSON output, stdout or stderr destination. The `KOS_LOG` environment
//! variable overrides the configured level with a full filter directive.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable carrying an `EnvFilter` directive set.
pub const LOG_ENV: &str = "KOS_LOG";

/// Logging configuration, usually carried in an extra `logging` section of
/// the effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: text or json
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr or stdout
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            output: default_output(),
        }
    }
}

/// Filter from `KOS_LOG` when set, otherwise the configured level.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Idempotent: a second call (common in
/// tests) leaves the first subscriber in place.
pub fn init(config: &LoggingConfig) {
    let filter = build_filter(&config.level);
    let builder = fmt().with_env_filter(filter);

    let result = match (config.format.as_str(), config.output.as_str()) {
        ("json", "stdout") => builder.json().try_init(),
        ("json", _) => builder.json().with_writer(std::io::stderr).try_init(),
        (_, "stdout") => builder.try_init(),
        _ => builder.with_writer(std::io::stderr).try_init(),
    };
    drop(result);
}
