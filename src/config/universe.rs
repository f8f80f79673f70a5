//! Tracked-universe selection thresholds (§4.G "Universe selection").

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub max_tracked_markets: usize,
    pub min_gamma_volume: Decimal,
    pub min_gamma_liquidity: Decimal,
    pub min_open_interest: Decimal,
    /// Condition ids always tracked regardless of volume/liquidity/OI.
    pub manual_overrides: BTreeSet<String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            max_tracked_markets: 500,
            min_gamma_volume: dec!(10000),
            min_gamma_liquidity: dec!(5000),
            min_open_interest: dec!(5000),
            manual_overrides: BTreeSet::new(),
        }
    }
}
