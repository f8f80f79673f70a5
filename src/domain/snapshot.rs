//! Append-only market metric time series (§3: `MarketMetricSnapshot`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::ConditionId;

#[derive(Debug, Clone)]
pub struct MarketMetricSnapshot {
    condition_id: ConditionId,
    ts: DateTime<Utc>,
    volume: Decimal,
    liquidity: Decimal,
    open_interest: Decimal,
    best_bid_yes: Option<Decimal>,
    best_ask_yes: Option<Decimal>,
    best_bid_no: Option<Decimal>,
    best_ask_no: Option<Decimal>,
}

impl MarketMetricSnapshot {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        condition_id: ConditionId,
        ts: DateTime<Utc>,
        volume: Decimal,
        liquidity: Decimal,
        open_interest: Decimal,
        best_bid_yes: Option<Decimal>,
        best_ask_yes: Option<Decimal>,
        best_bid_no: Option<Decimal>,
        best_ask_no: Option<Decimal>,
    ) -> Self {
        Self {
            condition_id,
            ts,
            volume,
            liquidity,
            open_interest,
            best_bid_yes,
            best_ask_yes,
            best_bid_no,
            best_ask_no,
        }
    }

    #[must_use]
    pub const fn condition_id(&self) -> &ConditionId {
        &self.condition_id
    }

    #[must_use]
    pub const fn ts(&self) -> DateTime<Utc> {
        self.ts
    }

    #[must_use]
    pub const fn volume(&self) -> Decimal {
        self.volume
    }

    #[must_use]
    pub const fn liquidity(&self) -> Decimal {
        self.liquidity
    }

    #[must_use]
    pub const fn open_interest(&self) -> Decimal {
        self.open_interest
    }

    #[must_use]
    pub const fn best_bid_yes(&self) -> Option<Decimal> {
        self.best_bid_yes
    }

    #[must_use]
    pub const fn best_ask_yes(&self) -> Option<Decimal> {
        self.best_ask_yes
    }

    #[must_use]
    pub const fn best_bid_no(&self) -> Option<Decimal> {
        self.best_bid_no
    }

    #[must_use]
    pub const fn best_ask_no(&self) -> Option<Decimal> {
        self.best_ask_no
    }

    #[must_use]
    pub fn spread_yes(&self) -> Option<Decimal> {
        match (self.best_ask_yes, self.best_bid_yes) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    #[must_use]
    pub fn spread_no(&self) -> Option<Decimal> {
        match (self.best_ask_no, self.best_bid_no) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }
}
