//! Normalizes REST and websocket orderbook payload shapes into domain types
//! (§4.B, §4.E, §6).

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::{ConditionId, OrderbookLatest, OrderbookMeta, PriceLevel, TokenId};
use crate::parse::numeric::{neg_risk_from_object, value_to_decimal};

/// One raw book object, from either the REST `/book` endpoint or a
/// websocket `book` message.
pub struct RawBook(pub Value);

/// A single `{price, size, side}` delta from a websocket `price_change`
/// message, already split out from the envelope.
pub struct PriceChange {
    pub price: Decimal,
    pub size: Decimal,
    pub side: crate::domain::BookSide,
}

fn levels_from_array(value: &Value) -> Vec<PriceLevel> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let obj = item.as_object()?;
                    let price = obj.get("price").and_then(value_to_decimal)?;
                    let size = obj.get("size").and_then(value_to_decimal)?;
                    Some(PriceLevel::new(price, size))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parses a full book snapshot. `bids`/`asks` and `buys`/`sells` are both
/// accepted spellings (§4.B).
#[must_use]
pub fn parse_book_snapshot(raw: &RawBook) -> Option<OrderbookLatest> {
    let obj = raw.0.as_object()?;

    let token_id = obj
        .get("asset_id")
        .or_else(|| obj.get("assetId"))
        .or_else(|| obj.get("token_id"))
        .and_then(Value::as_str)
        .map(TokenId::from)?;

    let bids = obj
        .get("bids")
        .or_else(|| obj.get("buys"))
        .map(levels_from_array)
        .unwrap_or_default();
    let asks = obj
        .get("asks")
        .or_else(|| obj.get("sells"))
        .map(levels_from_array)
        .unwrap_or_default();

    let as_of = parse_orderbook_timestamp(obj.get("timestamp")).unwrap_or_else(Utc::now);

    let meta = OrderbookMeta {
        tick_size: obj.get("tick_size").and_then(value_to_decimal).unwrap_or(OrderbookMeta::default().tick_size),
        min_order_size: obj
            .get("min_order_size")
            .and_then(value_to_decimal)
            .unwrap_or(Decimal::ZERO),
        neg_risk: neg_risk_from_object(obj),
        hash: obj.get("hash").and_then(Value::as_str).map(str::to_string),
    };

    let mut book = OrderbookLatest::new(token_id, bids, asks, as_of, meta);
    if let Some(condition_id) = obj
        .get("market")
        .or_else(|| obj.get("conditionId"))
        .and_then(Value::as_str)
    {
        book.set_condition_id(ConditionId::from(condition_id));
    }
    Some(book)
}

/// Normalizes both RFC3339 (REST) and millisecond-epoch (websocket) forms
/// to the same absolute instant (§4.B).
#[must_use]
pub fn parse_orderbook_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let value = value?;
    if let Some(s) = value.as_str() {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(ms) = s.parse::<i64>() {
            return Utc.timestamp_millis_opt(ms).single();
        }
    }
    if let Some(ms) = value.as_i64() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rest_snapshot_with_bids_asks() {
        let raw = RawBook(json!({
            "asset_id": "tok-1",
            "market": "0xcond",
            "bids": [{"price": "0.40", "size": "10"}],
            "asks": [{"price": "0.55", "size": "8"}],
            "tick_size": "0.001",
            "min_order_size": "5",
            "neg_risk": false,
            "timestamp": "2024-01-01T00:00:00Z",
        }));
        let book = parse_book_snapshot(&raw).unwrap();
        assert!(book.is_well_formed());
        assert_eq!(book.condition_id().unwrap().as_str(), "0xcond");
    }

    #[test]
    fn accepts_buys_sells_alias() {
        let raw = RawBook(json!({
            "asset_id": "tok-1",
            "buys": [{"price": "0.40", "size": "10"}],
            "sells": [{"price": "0.55", "size": "8"}],
            "timestamp": 1_700_000_000_000i64,
        }));
        let book = parse_book_snapshot(&raw).unwrap();
        assert_eq!(book.best_bid().unwrap().price(), Decimal::new(40, 2));
    }

    #[test]
    fn parses_both_timestamp_shapes() {
        assert!(parse_orderbook_timestamp(Some(&json!("2024-01-01T00:00:00Z"))).is_some());
        assert!(parse_orderbook_timestamp(Some(&json!(1_700_000_000_000i64))).is_some());
    }
}
