//! Job intervals and pagination caps (§4.F, §4.G, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub sync_gamma_events_secs: u64,
    pub sync_tag_metadata_secs: u64,
    pub sync_universe_secs: u64,
    pub sync_open_interest_secs: u64,
    pub sync_large_trades_secs: u64,
    pub sync_orderbooks_secs: u64,
    pub sync_positions_secs: u64,
    pub run_signal_engine_trades_secs: u64,
    pub run_signal_engine_arb_secs: u64,
    pub alert_dispatcher_secs: u64,
    pub orderbook_snapshot_interval_secs: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            sync_gamma_events_secs: 600,
            sync_tag_metadata_secs: 6 * 3600,
            sync_universe_secs: 900,
            sync_open_interest_secs: 300,
            sync_large_trades_secs: 45,
            sync_orderbooks_secs: 20,
            sync_positions_secs: 600,
            run_signal_engine_trades_secs: 45,
            run_signal_engine_arb_secs: 45,
            alert_dispatcher_secs: 10,
            orderbook_snapshot_interval_secs: 300,
        }
    }
}

/// Trades-endpoint pagination knobs (`TRADES_*`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradesFetchConfig {
    pub trade_safety_window_secs: i64,
    pub trades_max_pages: u32,
    pub trades_initial_lookback_hours: i64,
    pub page_limit: u32,
}

impl Default for TradesFetchConfig {
    fn default() -> Self {
        Self {
            trade_safety_window_secs: 120,
            trades_max_pages: 50,
            trades_initial_lookback_hours: 24,
            page_limit: 500,
        }
    }
}
