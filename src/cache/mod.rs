//! In-memory `token_id → latest aggregated book` cache (§4.D).
//!
//! Mutated by both the websocket consumer and the REST polling fallback;
//! each token's entry is guarded independently so one token's write never
//! blocks a reader of a different token.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use crate::domain::{BookSide, OrderbookLatest, OrderbookMeta, PriceLevel, TokenId};

/// Notification emitted whenever a token's book changes, for anything
/// downstream (e.g. the arb signal engine) that wants to react eagerly
/// rather than on its own polling interval.
#[derive(Debug, Clone)]
pub struct OrderbookUpdate {
    pub token_id: TokenId,
}

/// One `{price, size, side}` delta applied via [`OrderbookCache::apply_price_change`].
#[derive(Debug, Clone, Copy)]
pub struct PriceChange {
    pub price: Decimal,
    pub size: Decimal,
    pub side: BookSide,
}

pub struct OrderbookCache {
    books: RwLock<HashMap<TokenId, OrderbookLatest>>,
    tx: Option<broadcast::Sender<OrderbookUpdate>>,
}

impl OrderbookCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_notifications(capacity: usize) -> (Self, broadcast::Receiver<OrderbookUpdate>) {
        let (tx, rx) = broadcast::channel(capacity);
        (
            Self {
                books: RwLock::new(HashMap::new()),
                tx: Some(tx),
            },
            rx,
        )
    }

    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<OrderbookUpdate>> {
        self.tx.as_ref().map(broadcast::Sender::subscribe)
    }

    /// Replaces the stored levels for a token wholesale (§4.D).
    pub fn apply_snapshot(&self, book: OrderbookLatest) {
        let token_id = book.token_id().clone();
        self.books.write().insert(token_id.clone(), book);
        self.notify(token_id);
    }

    /// Applies a batch of price-change deltas to one token's book. Each
    /// change sets the aggregated size at `price` on `side`; a `size == 0`
    /// change removes that level. Strict price monotonicity is preserved by
    /// re-deriving the sorted/deduped level list from scratch (§4.D).
    ///
    /// A change against a token with no existing entry is dropped: deltas
    /// are only meaningful against a prior snapshot.
    pub fn apply_price_change(&self, token_id: &TokenId, changes: &[PriceChange], as_of: DateTime<Utc>) {
        let mut books = self.books.write();
        let Some(book) = books.get_mut(token_id) else { return };

        if as_of < book.as_of() {
            return;
        }

        let mut bids: Vec<PriceLevel> = book.bids().to_vec();
        let mut asks: Vec<PriceLevel> = book.asks().to_vec();

        for change in changes {
            let levels = match change.side {
                BookSide::Bid => &mut bids,
                BookSide::Ask => &mut asks,
            };
            levels.retain(|l| l.price() != change.price);
            if change.size > Decimal::ZERO {
                levels.push(PriceLevel::new(change.price, change.size));
            }
        }

        book.set_bids(bids);
        book.set_asks(asks);
        book.set_as_of(as_of);
        drop(books);
        self.notify(token_id.clone());
    }

    /// Updates just the tick size metadata for a token (`tick_size_change`).
    pub fn set_tick_size(&self, token_id: &TokenId, tick_size: Decimal) {
        if let Some(book) = self.books.write().get_mut(token_id) {
            book.set_tick_size(tick_size);
        }
    }

    #[must_use]
    pub fn get(&self, token_id: &TokenId) -> Option<OrderbookLatest> {
        self.books.read().get(token_id).cloned()
    }

    #[must_use]
    pub fn get_pair(&self, a: &TokenId, b: &TokenId) -> (Option<OrderbookLatest>, Option<OrderbookLatest>) {
        let books = self.books.read();
        (books.get(a).cloned(), books.get(b).cloned())
    }

    /// Seconds since `as_of` for a token's book, used by arb freshness
    /// checks (§4.D, §4.I).
    #[must_use]
    pub fn age(&self, token_id: &TokenId, now: DateTime<Utc>) -> Option<i64> {
        self.books.read().get(token_id).map(|b| (now - b.as_of()).num_seconds())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn tracked_tokens(&self) -> Vec<TokenId> {
        self.books.read().keys().cloned().collect()
    }

    fn notify(&self, token_id: TokenId) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(OrderbookUpdate { token_id });
        }
    }
}

impl Default for OrderbookCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderbookMeta as Meta;
    use rust_decimal_macros::dec;

    fn book(token: &str, as_of: DateTime<Utc>) -> OrderbookLatest {
        OrderbookLatest::new(
            TokenId::from(token),
            vec![PriceLevel::new(dec!(0.45), dec!(100))],
            vec![PriceLevel::new(dec!(0.50), dec!(100))],
            as_of,
            Meta::default(),
        )
    }

    #[test]
    fn apply_snapshot_then_get_round_trips() {
        let cache = OrderbookCache::new();
        cache.apply_snapshot(book("tok", Utc::now()));
        let got = cache.get(&TokenId::from("tok")).unwrap();
        assert_eq!(got.best_bid().unwrap().price(), dec!(0.45));
    }

    #[test]
    fn apply_price_change_removes_zero_size_level() {
        let cache = OrderbookCache::new();
        let t0 = Utc::now();
        cache.apply_snapshot(book("tok", t0));
        let token = TokenId::from("tok");
        cache.apply_price_change(
            &token,
            &[PriceChange { price: dec!(0.45), size: Decimal::ZERO, side: BookSide::Bid }],
            t0 + chrono::Duration::seconds(1),
        );
        let got = cache.get(&token).unwrap();
        assert!(got.best_bid().is_none());
    }

    #[test]
    fn apply_price_change_ignores_stale_as_of() {
        let cache = OrderbookCache::new();
        let t0 = Utc::now();
        cache.apply_snapshot(book("tok", t0));
        let token = TokenId::from("tok");
        cache.apply_price_change(
            &token,
            &[PriceChange { price: dec!(0.45), size: dec!(999), side: BookSide::Bid }],
            t0 - chrono::Duration::seconds(5),
        );
        let got = cache.get(&token).unwrap();
        assert_eq!(got.best_bid().unwrap().size(), dec!(100));
    }

    #[test]
    fn age_reports_seconds_since_as_of() {
        let cache = OrderbookCache::new();
        let t0 = Utc::now() - chrono::Duration::seconds(30);
        cache.apply_snapshot(book("tok", t0));
        let age = cache.age(&TokenId::from("tok"), Utc::now()).unwrap();
        assert!(age >= 29);
    }
}
