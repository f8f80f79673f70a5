//! Depth-aware binary arbitrage thresholds (§4.I).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArbConfig {
    /// `ARB_EDGE_MIN ∈ (0, 0.05]`.
    pub edge_min: Decimal,
    pub min_executable_shares: Decimal,
    pub max_shares_to_evaluate: Decimal,
    pub max_book_age_secs: i64,
    pub market_cooldown_secs: i64,
    pub taker_fee_bps: Decimal,
}

impl Default for ArbConfig {
    fn default() -> Self {
        Self {
            edge_min: dec!(0.01),
            min_executable_shares: dec!(50),
            max_shares_to_evaluate: dec!(5000),
            max_book_age_secs: 10,
            market_cooldown_secs: 120,
            taker_fee_bps: Decimal::ZERO,
        }
    }
}

impl ArbConfig {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.edge_min > Decimal::ZERO
            && self.edge_min <= dec!(0.05)
            && self.min_executable_shares > Decimal::ZERO
            && self.max_shares_to_evaluate >= self.min_executable_shares
            && self.max_book_age_secs > 0
    }
}
