//! Trade-signal thresholds (§4.H).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradeSignalConfig {
    pub taker_only: bool,
    pub large_trade_usd_threshold: Decimal,
    pub new_wallet_window_days: i64,
    pub dormant_window_days: i64,
    /// Liquidity floor used by the severity bump in §4.H ("market's latest
    /// liquidity snapshot is below a configured floor").
    pub liquidity_floor: Decimal,
}

impl Default for TradeSignalConfig {
    fn default() -> Self {
        Self {
            taker_only: true,
            large_trade_usd_threshold: dec!(10000),
            new_wallet_window_days: 7,
            dormant_window_days: 30,
            liquidity_floor: dec!(2000),
        }
    }
}
