//! Taker trade prints, as reported by the trades endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use super::ids::{ConditionId, TokenId, Wallet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Uniquely identifies a [`Trade`] for idempotent insertion (§3, §4.C).
///
/// Prefers the upstream `transaction_hash`; falls back to a composite hash
/// over the trade's natural key when the upstream didn't supply one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradeKey(String);

impl TradeKey {
    #[must_use]
    pub fn from_transaction_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    #[must_use]
    pub fn composite(
        wallet: &Wallet,
        condition_id: &ConditionId,
        token_id: &TokenId,
        side: Side,
        upstream_ts: DateTime<Utc>,
        size: Decimal,
        price: Decimal,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(wallet.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(condition_id.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(token_id.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(side.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(upstream_ts.timestamp_millis().to_le_bytes());
        hasher.update(b"|");
        hasher.update(size.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(price.to_string().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single taker trade print. Append-only; never mutated once stored.
#[derive(Debug, Clone)]
pub struct Trade {
    key: TradeKey,
    transaction_hash: Option<String>,
    wallet: Wallet,
    condition_id: ConditionId,
    token_id: TokenId,
    side: Side,
    price: Decimal,
    size: Decimal,
    trade_ts: DateTime<Utc>,
}

impl Trade {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_hash: Option<String>,
        wallet: Wallet,
        condition_id: ConditionId,
        token_id: TokenId,
        side: Side,
        price: Decimal,
        size: Decimal,
        trade_ts: DateTime<Utc>,
    ) -> Self {
        let key = match &transaction_hash {
            Some(hash) => TradeKey::from_transaction_hash(hash),
            None => TradeKey::composite(&wallet, &condition_id, &token_id, side, trade_ts, size, price),
        };
        Self {
            key,
            transaction_hash,
            wallet,
            condition_id,
            token_id,
            side,
            price,
            size,
            trade_ts,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &TradeKey {
        &self.key
    }

    #[must_use]
    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    #[must_use]
    pub const fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    #[must_use]
    pub const fn condition_id(&self) -> &ConditionId {
        &self.condition_id
    }

    #[must_use]
    pub const fn token_id(&self) -> &TokenId {
        &self.token_id
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn size(&self) -> Decimal {
        self.size
    }

    #[must_use]
    pub const fn trade_ts(&self) -> DateTime<Utc> {
        self.trade_ts
    }

    /// `notional_usd = price · size` (§3).
    #[must_use]
    pub fn notional_usd(&self) -> Decimal {
        self.price * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wallet() -> Wallet {
        Wallet::from("0xWALLET")
    }

    fn condition() -> ConditionId {
        ConditionId::from("0xCOND")
    }

    fn token() -> TokenId {
        TokenId::from("0xTOKEN")
    }

    #[test]
    fn notional_is_price_times_size() {
        let t = Trade::new(
            Some("0xTX".into()),
            wallet(),
            condition(),
            token(),
            Side::Buy,
            dec!(0.6),
            dec!(20000),
            Utc::now(),
        );
        assert_eq!(t.notional_usd(), dec!(12000.0));
    }

    #[test]
    fn same_transaction_hash_yields_same_key() {
        let t1 = Trade::new(Some("0xTX".into()), wallet(), condition(), token(), Side::Buy, dec!(1), dec!(1), Utc::now());
        let t2 = Trade::new(Some("0xTX".into()), wallet(), condition(), token(), Side::Sell, dec!(2), dec!(2), Utc::now());
        assert_eq!(t1.key(), t2.key());
    }

    #[test]
    fn missing_transaction_hash_uses_composite_key_identical_for_identical_trades() {
        let ts = Utc::now();
        let t1 = Trade::new(None, wallet(), condition(), token(), Side::Buy, dec!(0.5), dec!(10), ts);
        let t2 = Trade::new(None, wallet(), condition(), token(), Side::Buy, dec!(0.5), dec!(10), ts);
        assert_eq!(t1.key(), t2.key());

        let t3 = Trade::new(None, wallet(), condition(), token(), Side::Buy, dec!(0.5), dec!(11), ts);
        assert_ne!(t1.key(), t3.key());
    }
}
