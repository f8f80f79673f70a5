//! Logging configuration and initialization (AMBIENT.3).

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `"pretty"` for local development, `"json"` for production.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the global `tracing` subscriber. Safe to call once at
    /// process startup; a second call is a no-op (errors are swallowed).
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = if self.format == "json" {
            tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).try_init()
        };

        if let Err(e) = result {
            eprintln!("failed to initialize logging (already initialized?): {e}");
        }
    }
}
