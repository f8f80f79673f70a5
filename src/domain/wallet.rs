//! Wallet state, updated on every observed trade (§4.H step 2).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::Wallet as WalletId;

#[derive(Debug, Clone)]
pub struct Wallet {
    address: WalletId,
    first_seen_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    first_trade_ts: DateTime<Utc>,
    lifetime_notional_usd: Decimal,
    last_7d_notional_usd: Decimal,
}

impl Wallet {
    /// Construct the row created on first trade observation (§3: "Created on first trade observation").
    #[must_use]
    pub fn first_seen(address: WalletId, now: DateTime<Utc>, first_trade_ts: DateTime<Utc>) -> Self {
        Self {
            address,
            first_seen_at: now,
            last_seen_at: now,
            first_trade_ts,
            lifetime_notional_usd: Decimal::ZERO,
            last_7d_notional_usd: Decimal::ZERO,
        }
    }

    /// Reconstructs a `Wallet` from its persisted row. Prefer
    /// [`Wallet::first_seen`] plus [`Wallet::observe_trade`] for new
    /// observations; this exists for the storage layer's round-trip.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_row(
        address: WalletId,
        first_seen_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
        first_trade_ts: DateTime<Utc>,
        lifetime_notional_usd: Decimal,
        last_7d_notional_usd: Decimal,
    ) -> Self {
        Self {
            address,
            first_seen_at,
            last_seen_at,
            first_trade_ts,
            lifetime_notional_usd,
            last_7d_notional_usd,
        }
    }

    #[must_use]
    pub const fn address(&self) -> &WalletId {
        &self.address
    }

    #[must_use]
    pub const fn first_seen_at(&self) -> DateTime<Utc> {
        self.first_seen_at
    }

    #[must_use]
    pub const fn last_seen_at(&self) -> DateTime<Utc> {
        self.last_seen_at
    }

    #[must_use]
    pub const fn first_trade_ts(&self) -> DateTime<Utc> {
        self.first_trade_ts
    }

    #[must_use]
    pub const fn lifetime_notional_usd(&self) -> Decimal {
        self.lifetime_notional_usd
    }

    #[must_use]
    pub const fn last_7d_notional_usd(&self) -> Decimal {
        self.last_7d_notional_usd
    }

    /// Record another observed trade: always bumps `last_seen_at` and
    /// `lifetime_notional_usd` (§4.H step 2); `first_seen_at`/`first_trade_ts`
    /// are set only once, at construction.
    pub fn observe_trade(&mut self, now: DateTime<Utc>, notional_usd: Decimal) {
        self.last_seen_at = now;
        self.lifetime_notional_usd += notional_usd;
    }

    pub fn set_last_7d_notional_usd(&mut self, value: Decimal) {
        self.last_7d_notional_usd = value;
    }

    /// `true` iff `trade_ts <= first_seen_at + window_days` (§4.H step 4).
    #[must_use]
    pub fn is_new_as_of(&self, trade_ts: DateTime<Utc>, window_days: i64) -> bool {
        trade_ts <= self.first_seen_at + chrono::Duration::days(window_days)
    }

    /// `true` iff the gap between `last_seen_at` (prior to this trade) and
    /// `trade_ts` exceeds `dormant_window_days` (§4.H step 5).
    ///
    /// Callers must pass the wallet's `last_seen_at` *before* calling
    /// [`Wallet::observe_trade`] for the current trade, since that call
    /// overwrites it.
    #[must_use]
    pub fn is_reactivation(previous_last_seen_at: DateTime<Utc>, trade_ts: DateTime<Utc>, dormant_window_days: i64) -> bool {
        trade_ts - previous_last_seen_at > chrono::Duration::days(dormant_window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> WalletId {
        WalletId::from("0xA")
    }

    #[test]
    fn first_seen_sets_all_timestamps_equal() {
        let now = Utc::now();
        let w = Wallet::first_seen(addr(), now, now);
        assert_eq!(w.first_seen_at(), now);
        assert_eq!(w.last_seen_at(), now);
        assert_eq!(w.first_trade_ts(), now);
    }

    #[test]
    fn observe_trade_accumulates_notional_and_bumps_last_seen() {
        let t0 = Utc::now();
        let mut w = Wallet::first_seen(addr(), t0, t0);
        let t1 = t0 + chrono::Duration::hours(1);
        w.observe_trade(t1, rust_decimal_macros::dec!(100));
        w.observe_trade(t1, rust_decimal_macros::dec!(50));
        assert_eq!(w.lifetime_notional_usd(), rust_decimal_macros::dec!(150));
        assert_eq!(w.last_seen_at(), t1);
    }

    #[test]
    fn is_new_as_of_window_boundary() {
        let t0 = Utc::now();
        let w = Wallet::first_seen(addr(), t0, t0);
        assert!(w.is_new_as_of(t0 + chrono::Duration::days(7), 7));
        assert!(!w.is_new_as_of(t0 + chrono::Duration::days(7) + chrono::Duration::seconds(1), 7));
    }

    #[test]
    fn is_reactivation_detects_dormancy_gap() {
        let t0 = Utc::now();
        let trade_ts = t0 + chrono::Duration::days(45);
        assert!(Wallet::is_reactivation(t0, trade_ts, 30));
        assert!(!Wallet::is_reactivation(t0, t0 + chrono::Duration::days(10), 30));
    }
}
