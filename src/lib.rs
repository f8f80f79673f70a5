//! marketwatch - read-only ingestion and signal pipeline for a prediction-market venue.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── config/      # Layered configuration (defaults < DB overrides < env)
//! ├── domain/       # Pure domain types (markets, trades, wallets, signals)
//! ├── http/         # Rate-paced, retrying REST executor
//! ├── parse/        # Upstream JSON -> domain normalizers
//! ├── db/            # Diesel storage layer
//! ├── cache/        # In-memory orderbook cache
//! ├── exchange/      # Polymarket REST + websocket clients
//! ├── scheduler/    # Cooperative fixed-interval job runner
//! ├── signals/      # Trade and arbitrage signal engines
//! ├── alerts/       # Alert dispatcher and channel drivers
//! ├── jobs/         # Concrete fetch/processing jobs wired to the scheduler
//! ├── metrics.rs    # In-process metrics snapshot
//! └── cli/          # Command-line entrypoint
//! ```
//!
//! # Features
//!
//! - `slack` - Enable the Slack alert channel (default)
//! - `telegram` - Enable the Telegram alert channel (default)
//! - `email` - Enable the SMTP alert channel (default)

pub mod alerts;
pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod http;
pub mod jobs;
pub mod metrics;
pub mod parse;
pub mod scheduler;
pub mod signals;
