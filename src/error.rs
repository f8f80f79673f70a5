//! Crate-wide error types.

use thiserror::Error;

/// Configuration-layer failures, surfaced as [`Error::Config`] at the boundary.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },

    #[error("failed to read configuration file: {0}")]
    ReadFile(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("database migration error: {0}")]
    Migration(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("throttled by upstream, retry after widened backoff")]
    Throttled,

    #[error("validation failure: {0}")]
    Validation(String),

    #[error("fatal configuration error, refusing to start: {0}")]
    FatalConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
