//! Layered application configuration.
//!
//! Precedence: baked defaults < runtime DB-backed overrides < environment
//! variables (§6). The DB-backed overlay lives in `crate::db::config_store`
//! and is merged in by the caller before environment variables are applied
//! here, since it requires a pool that this module does not own.

mod alerts;
mod arb;
mod database;
mod http;
mod logging;
mod scheduling;
mod signals;
mod universe;
mod upstream;
mod websocket;

pub use alerts::{AlertConfig, ChannelKind, EmailConfig, SlackConfig, TelegramConfig};
pub use arb::ArbConfig;
pub use database::DatabaseConfig;
pub use http::HttpConfig;
pub use logging::LoggingConfig;
pub use scheduling::{SchedulingConfig, TradesFetchConfig};
pub use signals::TradeSignalConfig;
pub use universe::UniverseConfig;
pub use upstream::UpstreamConfig;
pub use websocket::WebsocketConfig;

use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// The fully-resolved configuration for one process lifetime.
///
/// Each section derives `Default` and `#[serde(default)]`, so a TOML file
/// may specify only the keys it wants to override; everything else falls
/// back to baked defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub upstream: UpstreamConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub scheduling: SchedulingConfig,
    pub trades_fetch: TradesFetchConfig,
    pub universe: UniverseConfig,
    pub signals: TradeSignalConfig,
    pub arb: ArbConfig,
    pub alerts: AlertConfig,
    pub websocket: WebsocketConfig,
}

impl AppConfig {
    /// Loads baked defaults overlaid by an optional TOML file, without
    /// environment overrides or validation. Callers who need to splice the
    /// DB-backed overlay in between TOML and environment variables (§6) use
    /// this plus [`AppConfig::apply_db_overrides`] and
    /// [`AppConfig::apply_env_overrides`] directly; [`AppConfig::load`] is
    /// the shortcut for callers with no DB pool (`check`/`status`).
    pub fn load_base(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&raw)?)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Loads baked defaults, overlays an optional TOML file, then applies
    /// environment variable overrides, and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load_base(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies the DB-backed runtime overrides (middle layer of the
    /// precedence in §6), keyed by the same names as the environment
    /// variables below so an operator only has to learn one vocabulary.
    /// Unknown keys (e.g. `tag_dictionary`, which isn't an `AppConfig`
    /// field at all) are ignored.
    pub fn apply_db_overrides(&mut self, overrides: &[(String, Value)]) {
        let overrides: std::collections::HashMap<&str, &Value> =
            overrides.iter().map(|(k, v)| (k.as_str(), v)).collect();

        if let Some(v) = overrides.get("DATABASE_URL").and_then(|v| v.as_str()) {
            self.database.url = v.to_string();
        }
        db_u64(&overrides, &mut self.scheduling.sync_gamma_events_secs, "SYNC_GAMMA_EVENTS_SECS");
        db_u64(&overrides, &mut self.scheduling.sync_tag_metadata_secs, "SYNC_TAG_METADATA_SECS");
        db_u64(&overrides, &mut self.scheduling.sync_universe_secs, "SYNC_UNIVERSE_SECS");
        db_u64(&overrides, &mut self.scheduling.sync_open_interest_secs, "SYNC_OPEN_INTEREST_SECS");
        db_u64(&overrides, &mut self.scheduling.sync_large_trades_secs, "SYNC_LARGE_TRADES_SECS");
        db_u64(&overrides, &mut self.scheduling.sync_orderbooks_secs, "SYNC_ORDERBOOKS_SECS");
        db_u64(&overrides, &mut self.scheduling.sync_positions_secs, "SYNC_POSITIONS_SECS");

        db_i64(&overrides, &mut self.trades_fetch.trade_safety_window_secs, "TRADES_SAFETY_WINDOW_SECS");
        db_u32(&overrides, &mut self.trades_fetch.trades_max_pages, "TRADES_MAX_PAGES");

        db_usize(&overrides, &mut self.universe.max_tracked_markets, "MAX_TRACKED_MARKETS");
        db_decimal(&overrides, &mut self.universe.min_gamma_volume, "MIN_GAMMA_VOLUME");
        db_decimal(&overrides, &mut self.universe.min_gamma_liquidity, "MIN_GAMMA_LIQUIDITY");

        db_decimal(&overrides, &mut self.signals.large_trade_usd_threshold, "LARGE_TRADE_USD_THRESHOLD");
        db_i64(&overrides, &mut self.signals.new_wallet_window_days, "NEW_WALLET_WINDOW_DAYS");
        db_i64(&overrides, &mut self.signals.dormant_window_days, "DORMANT_WINDOW_DAYS");

        db_decimal(&overrides, &mut self.arb.edge_min, "ARB_EDGE_MIN");
        db_decimal(&overrides, &mut self.arb.min_executable_shares, "ARB_MIN_EXECUTABLE_SHARES");
        db_i64(&overrides, &mut self.arb.market_cooldown_secs, "ARB_MARKET_COOLDOWN_SECONDS");
        db_decimal(&overrides, &mut self.arb.taker_fee_bps, "TAKER_FEE_BPS");

        if let Some(v) = overrides.get("ALERT_MIN_SEVERITY").and_then(|v| v.as_u64()) {
            self.alerts.min_severity = v as u8;
        }
        db_i64(&overrides, &mut self.alerts.dedup_window_secs, "ALERT_DEDUP_WINDOW_SECONDS");
    }

    /// Applies the environment variable names enumerated in the external
    /// interface contract, on top of whatever defaults/TOML/DB overrides
    /// produced — the top layer of the §6 precedence.
    pub fn apply_env_overrides(&mut self) {
        use std::env::var;

        if let Ok(url) = var("DATABASE_URL") {
            self.database.url = url;
        }
        env_u64(&mut self.scheduling.sync_gamma_events_secs, "SYNC_GAMMA_EVENTS_SECS");
        env_u64(&mut self.scheduling.sync_tag_metadata_secs, "SYNC_TAG_METADATA_SECS");
        env_u64(&mut self.scheduling.sync_universe_secs, "SYNC_UNIVERSE_SECS");
        env_u64(&mut self.scheduling.sync_open_interest_secs, "SYNC_OPEN_INTEREST_SECS");
        env_u64(&mut self.scheduling.sync_large_trades_secs, "SYNC_LARGE_TRADES_SECS");
        env_u64(&mut self.scheduling.sync_orderbooks_secs, "SYNC_ORDERBOOKS_SECS");
        env_u64(&mut self.scheduling.sync_positions_secs, "SYNC_POSITIONS_SECS");
        env_u64(
            &mut self.scheduling.orderbook_snapshot_interval_secs,
            "ORDERBOOK_SNAPSHOT_INTERVAL_SECONDS",
        );
        env_i64(
            &mut self.trades_fetch.trade_safety_window_secs,
            "TRADES_SAFETY_WINDOW_SECS",
        );
        env_u32(&mut self.trades_fetch.trades_max_pages, "TRADES_MAX_PAGES");
        env_i64(
            &mut self.trades_fetch.trades_initial_lookback_hours,
            "TRADES_INITIAL_LOOKBACK_HOURS",
        );

        env_usize(&mut self.universe.max_tracked_markets, "MAX_TRACKED_MARKETS");
        env_decimal(&mut self.universe.min_gamma_volume, "MIN_GAMMA_VOLUME");
        env_decimal(&mut self.universe.min_gamma_liquidity, "MIN_GAMMA_LIQUIDITY");
        env_decimal(&mut self.universe.min_open_interest, "MIN_OPEN_INTEREST");

        if let Ok(flag) = var("TAKER_ONLY") {
            self.signals.taker_only = parse_bool(&flag, self.signals.taker_only);
        }
        env_decimal(
            &mut self.signals.large_trade_usd_threshold,
            "LARGE_TRADE_USD_THRESHOLD",
        );
        env_i64(&mut self.signals.new_wallet_window_days, "NEW_WALLET_WINDOW_DAYS");
        env_i64(&mut self.signals.dormant_window_days, "DORMANT_WINDOW_DAYS");

        env_decimal(&mut self.arb.edge_min, "ARB_EDGE_MIN");
        env_decimal(&mut self.arb.min_executable_shares, "ARB_MIN_EXECUTABLE_SHARES");
        env_decimal(&mut self.arb.max_shares_to_evaluate, "ARB_MAX_SHARES_TO_EVALUATE");
        env_i64(&mut self.arb.max_book_age_secs, "ARB_MAX_BOOK_AGE_SECONDS");
        env_i64(&mut self.arb.market_cooldown_secs, "ARB_MARKET_COOLDOWN_SECONDS");
        env_decimal(&mut self.arb.taker_fee_bps, "TAKER_FEE_BPS");

        if let Ok(flag) = var("ALERTS_ENABLED") {
            self.alerts.enabled = parse_bool(&flag, self.alerts.enabled);
        }
        if let Ok(list) = var("ALERT_CHANNELS") {
            let parsed: Vec<ChannelKind> = list
                .split(',')
                .filter_map(|s| match s.trim().to_ascii_lowercase().as_str() {
                    "log" => Some(ChannelKind::Log),
                    "slack" => Some(ChannelKind::Slack),
                    "telegram" => Some(ChannelKind::Telegram),
                    "email" => Some(ChannelKind::Email),
                    _ => None,
                })
                .collect();
            if !parsed.is_empty() {
                self.alerts.channels = parsed;
            }
        }
        env_i64(&mut self.alerts.dedup_window_secs, "ALERT_DEDUP_WINDOW_SECONDS");
        if let Ok(sev) = var("ALERT_MIN_SEVERITY") {
            if let Ok(parsed) = sev.parse() {
                self.alerts.min_severity = parsed;
            }
        }
        if let Ok(url) = var("SLACK_WEBHOOK_URL") {
            self.alerts.slack.webhook_url = Some(url);
        }
        if let Ok(token) = var("TELEGRAM_BOT_TOKEN") {
            self.alerts.telegram.bot_token = Some(token);
        }
        if let Ok(chat_id) = var("TELEGRAM_CHAT_ID") {
            self.alerts.telegram.chat_id = Some(chat_id);
        }
        if let Ok(host) = var("SMTP_HOST") {
            self.alerts.email.smtp_host = Some(host);
        }

        if let Ok(flag) = var("CLOB_WS_ENABLED") {
            self.websocket.enabled = parse_bool(&flag, self.websocket.enabled);
        }
        if let Ok(url) = var("CLOB_WS_URL") {
            self.websocket.url = url;
        }
        if let Ok(list) = var("CLOB_WS_FALLBACK_URLS") {
            self.websocket.fallback_urls =
                list.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        env_usize(&mut self.websocket.max_assets, "CLOB_WS_MAX_ASSETS");
        env_u64(&mut self.websocket.ping_interval_secs, "CLOB_WS_PING_SECONDS");
    }

    /// Cross-field validation. Failures here are `FatalConfig`: the process
    /// must refuse to start (§7).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database.url" });
        }
        if !self.arb.is_valid() {
            return Err(ConfigError::InvalidValue {
                field: "arb.edge_min",
                reason: "must be in (0, 0.05] with min_executable_shares <= max_shares_to_evaluate"
                    .to_string(),
            });
        }
        if self.universe.max_tracked_markets == 0 {
            return Err(ConfigError::InvalidValue {
                field: "universe.max_tracked_markets",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// A subset of the resolved configuration, embedded verbatim into every
    /// `SignalEvent` payload's `config_snapshot` (§6).
    #[must_use]
    pub fn arb_config_snapshot(&self) -> Value {
        serde_json::json!({
            "arb_edge_min": self.arb.edge_min,
            "arb_min_executable_shares": self.arb.min_executable_shares,
            "arb_max_shares_to_evaluate": self.arb.max_shares_to_evaluate,
            "arb_max_book_age_seconds": self.arb.max_book_age_secs,
            "taker_fee_bps": self.arb.taker_fee_bps,
        })
    }

    #[must_use]
    pub fn trade_signal_config_snapshot(&self) -> Value {
        serde_json::json!({
            "large_trade_usd_threshold": self.signals.large_trade_usd_threshold,
            "new_wallet_window_days": self.signals.new_wallet_window_days,
            "dormant_window_days": self.signals.dormant_window_days,
            "liquidity_floor": self.signals.liquidity_floor,
        })
    }
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn env_u64(target: &mut u64, key: &str) {
    if let Ok(raw) = std::env::var(key) {
        if let Ok(parsed) = raw.parse() {
            *target = parsed;
        }
    }
}

fn env_u32(target: &mut u32, key: &str) {
    if let Ok(raw) = std::env::var(key) {
        if let Ok(parsed) = raw.parse() {
            *target = parsed;
        }
    }
}

fn env_usize(target: &mut usize, key: &str) {
    if let Ok(raw) = std::env::var(key) {
        if let Ok(parsed) = raw.parse() {
            *target = parsed;
        }
    }
}

fn env_i64(target: &mut i64, key: &str) {
    if let Ok(raw) = std::env::var(key) {
        if let Ok(parsed) = raw.parse() {
            *target = parsed;
        }
    }
}

fn env_decimal(target: &mut rust_decimal::Decimal, key: &str) {
    if let Ok(raw) = std::env::var(key) {
        if let Ok(parsed) = raw.parse() {
            *target = parsed;
        }
    }
}

fn db_u64(overrides: &std::collections::HashMap<&str, &Value>, target: &mut u64, key: &str) {
    if let Some(v) = overrides.get(key).and_then(|v| v.as_u64()) {
        *target = v;
    }
}

fn db_u32(overrides: &std::collections::HashMap<&str, &Value>, target: &mut u32, key: &str) {
    if let Some(v) = overrides.get(key).and_then(|v| v.as_u64()) {
        *target = v as u32;
    }
}

fn db_usize(overrides: &std::collections::HashMap<&str, &Value>, target: &mut usize, key: &str) {
    if let Some(v) = overrides.get(key).and_then(|v| v.as_u64()) {
        *target = v as usize;
    }
}

fn db_i64(overrides: &std::collections::HashMap<&str, &Value>, target: &mut i64, key: &str) {
    if let Some(v) = overrides.get(key).and_then(|v| v.as_i64()) {
        *target = v;
    }
}

fn db_decimal(overrides: &std::collections::HashMap<&str, &Value>, target: &mut rust_decimal::Decimal, key: &str) {
    if let Some(v) = overrides.get(key).and_then(|v| v.as_str()) {
        if let Ok(parsed) = v.parse() {
            *target = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_edge_min_fails_validation() {
        let mut config = AppConfig::default();
        config.arb.edge_min = rust_decimal::Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn db_override_widens_edge_min() {
        let mut config = AppConfig::default();
        let overrides = vec![("ARB_EDGE_MIN".to_string(), serde_json::json!("0.03"))];
        config.apply_db_overrides(&overrides);
        assert_eq!(config.arb.edge_min, rust_decimal::Decimal::new(3, 2));
    }

    #[test]
    fn db_override_ignores_unknown_keys() {
        let mut config = AppConfig::default();
        let before = config.clone();
        let overrides = vec![("tag_dictionary".to_string(), serde_json::json!(["politics"]))];
        config.apply_db_overrides(&overrides);
        assert_eq!(config.arb.edge_min, before.arb.edge_min);
    }

    #[test]
    fn env_override_widens_edge_min() {
        std::env::set_var("ARB_EDGE_MIN", "0.02");
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        std::env::remove_var("ARB_EDGE_MIN");
        assert_eq!(config.arb.edge_min, rust_decimal::Decimal::new(2, 2));
    }
}
