//! Orderbook domain types shared by the REST snapshot parser, the websocket
//! consumer and the in-memory cache (component D).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::{ConditionId, TokenId};

/// A single aggregated price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub struct PriceLevel {
    price: Decimal,
    size: Decimal,
}

impl PriceLevel {
    #[must_use]
    pub const fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn size(&self) -> Decimal {
        self.size
    }
}

/// Which side of the book a price-change update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

/// Metadata accompanying an orderbook that doesn't change with every update.
#[derive(Debug, Clone)]
pub struct OrderbookMeta {
    pub tick_size: Decimal,
    pub min_order_size: Decimal,
    pub neg_risk: bool,
    pub hash: Option<String>,
}

impl Default for OrderbookMeta {
    fn default() -> Self {
        Self {
            tick_size: Decimal::new(1, 3),
            min_order_size: Decimal::ZERO,
            neg_risk: false,
            hash: None,
        }
    }
}

/// The latest known book for one token: bids best-first (descending price),
/// asks best-first (ascending price). Both sides are kept strictly
/// monotonic in price with strictly positive sizes (§3 invariant).
#[derive(Debug, Clone)]
pub struct OrderbookLatest {
    token_id: TokenId,
    condition_id: Option<ConditionId>,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    as_of: DateTime<Utc>,
    meta: OrderbookMeta,
}

impl OrderbookLatest {
    #[must_use]
    pub fn new(
        token_id: TokenId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
        as_of: DateTime<Utc>,
        meta: OrderbookMeta,
    ) -> Self {
        let mut book = Self {
            token_id,
            condition_id: None,
            bids: Vec::new(),
            asks: Vec::new(),
            as_of,
            meta,
        };
        book.set_bids(bids);
        book.set_asks(asks);
        book
    }

    #[must_use]
    pub const fn token_id(&self) -> &TokenId {
        &self.token_id
    }

    #[must_use]
    pub const fn condition_id(&self) -> Option<&ConditionId> {
        self.condition_id.as_ref()
    }

    pub fn set_condition_id(&mut self, condition_id: ConditionId) {
        self.condition_id = Some(condition_id);
    }

    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    #[must_use]
    pub const fn meta(&self) -> &OrderbookMeta {
        &self.meta
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }

    /// Replace the bid side, dropping non-positive sizes/prices and
    /// enforcing strictly-descending price order.
    pub fn set_bids(&mut self, levels: Vec<PriceLevel>) {
        self.bids = Self::normalize(levels, true);
    }

    /// Replace the ask side, dropping non-positive sizes/prices and
    /// enforcing strictly-ascending price order.
    pub fn set_asks(&mut self, levels: Vec<PriceLevel>) {
        self.asks = Self::normalize(levels, false);
    }

    pub fn set_as_of(&mut self, as_of: DateTime<Utc>) {
        self.as_of = as_of;
    }

    pub fn set_tick_size(&mut self, tick_size: Decimal) {
        self.meta.tick_size = tick_size;
    }

    fn normalize(levels: Vec<PriceLevel>, descending: bool) -> Vec<PriceLevel> {
        let mut valid: Vec<PriceLevel> = levels
            .into_iter()
            .filter(|l| l.price > Decimal::ZERO && l.size > Decimal::ZERO)
            .collect();
        if descending {
            valid.sort_by(|a, b| b.price.cmp(&a.price));
        } else {
            valid.sort_by(|a, b| a.price.cmp(&b.price));
        }
        valid.dedup_by(|a, b| a.price == b.price);
        valid
    }

    /// Strict-monotonicity + positive-size invariant check, useful in tests
    /// and as a guard before trusting a freshly-parsed book.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        Self::strictly_monotonic(&self.bids, true) && Self::strictly_monotonic(&self.asks, false)
    }

    fn strictly_monotonic(levels: &[PriceLevel], descending: bool) -> bool {
        levels.iter().all(|l| l.price > Decimal::ZERO && l.size > Decimal::ZERO)
            && levels.windows(2).all(|w| {
                if descending {
                    w[0].price > w[1].price
                } else {
                    w[0].price < w[1].price
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderbookLatest {
        OrderbookLatest::new(
            TokenId::from("tok"),
            vec![PriceLevel::new(dec!(0.40), dec!(10)), PriceLevel::new(dec!(0.45), dec!(5))],
            vec![PriceLevel::new(dec!(0.55), dec!(8)), PriceLevel::new(dec!(0.50), dec!(12))],
            Utc::now(),
            OrderbookMeta::default(),
        )
    }

    #[test]
    fn bids_sort_descending_asks_ascending() {
        let b = book();
        assert_eq!(b.best_bid().unwrap().price(), dec!(0.45));
        assert_eq!(b.best_ask().unwrap().price(), dec!(0.50));
        assert!(b.is_well_formed());
    }

    #[test]
    fn non_positive_levels_are_dropped() {
        let mut b = book();
        b.set_asks(vec![PriceLevel::new(dec!(0.0), dec!(5)), PriceLevel::new(dec!(0.3), dec!(-1))]);
        assert!(b.asks().is_empty());
    }

    #[test]
    fn duplicate_price_levels_are_deduped() {
        let mut b = book();
        b.set_bids(vec![
            PriceLevel::new(dec!(0.4), dec!(1)),
            PriceLevel::new(dec!(0.4), dec!(2)),
        ]);
        assert_eq!(b.bids().len(), 1);
    }
}
