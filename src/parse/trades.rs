//! Normalizes the taker-trades upstream payload shape (§4.B, §6).

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use crate::domain::{ConditionId, Trade, TokenId, TradeSide, WalletId};
use crate::parse::numeric::value_to_decimal;

/// One raw trade object from the trades endpoint.
pub struct RawTrade(pub Value);

/// Parses one trade. Returns `None` (and logs) when a required field is
/// absent or unparseable; this never aborts the surrounding page.
#[must_use]
pub fn parse_trade(raw: &RawTrade) -> Option<Trade> {
    let obj = raw.0.as_object()?;

    let wallet = obj
        .get("proxyWallet")
        .or_else(|| obj.get("user"))
        .or_else(|| obj.get("owner"))
        .and_then(Value::as_str)
        .map(WalletId::from)?;

    let condition_id = obj
        .get("conditionId")
        .or_else(|| obj.get("condition_id"))
        .and_then(Value::as_str)
        .map(ConditionId::from)?;

    let token_id = obj
        .get("asset")
        .or_else(|| obj.get("assetId"))
        .or_else(|| obj.get("token_id"))
        .and_then(Value::as_str)
        .map(TokenId::from)?;

    let side = obj
        .get("side")
        .and_then(Value::as_str)
        .and_then(|s| match s.to_ascii_uppercase().as_str() {
            "BUY" => Some(TradeSide::Buy),
            "SELL" => Some(TradeSide::Sell),
            _ => None,
        })?;

    let price = obj.get("price").and_then(value_to_decimal)?;
    let size = obj.get("size").and_then(value_to_decimal)?;

    if price <= rust_decimal::Decimal::ZERO || size <= rust_decimal::Decimal::ZERO {
        debug!(%condition_id, "dropping trade with non-positive price or size");
        return None;
    }

    let trade_ts = obj
        .get("timestamp")
        .and_then(Value::as_i64)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .or_else(|| {
            obj.get("timestamp")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
        })?;

    let transaction_hash = obj
        .get("transactionHash")
        .or_else(|| obj.get("transaction_hash"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty());

    Some(Trade::new(
        transaction_hash,
        wallet,
        condition_id,
        token_id,
        side,
        price,
        size,
        trade_ts,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_trade_with_millisecond_timestamp() {
        let raw = RawTrade(json!({
            "proxyWallet": "0xabc",
            "conditionId": "0xcond",
            "asset": "tok-1",
            "side": "BUY",
            "price": "0.5",
            "size": "100",
            "timestamp": 1_700_000_000_000i64,
            "transactionHash": "0xdead",
        }));
        let trade = parse_trade(&raw).unwrap();
        assert_eq!(trade.notional_usd(), rust_decimal::Decimal::new(50, 0));
    }

    #[test]
    fn missing_price_is_dropped() {
        let raw = RawTrade(json!({
            "proxyWallet": "0xabc",
            "conditionId": "0xcond",
            "asset": "tok-1",
            "side": "BUY",
            "size": "100",
            "timestamp": 1_700_000_000_000i64,
        }));
        assert!(parse_trade(&raw).is_none());
    }
}
