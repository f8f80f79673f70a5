//! Normalizes the events/markets (`gamma`) upstream payload shape (§4.B).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::domain::{ConditionId, EventId, Market, Outcome, TokenId};
use crate::parse::numeric::{neg_risk_from_object, string_array_or_encoded_string, value_to_decimal};

/// One raw market object from the events/markets endpoint, loosely typed so
/// that unknown fields are tolerated and dropped rather than failing parse.
pub struct RawMarket(pub Value);

/// Parsed market plus the gamma-reported volume/liquidity, used by universe
/// selection (§4.G) without re-parsing the raw payload.
pub struct ParsedGammaMarket {
    pub market: Market,
    pub volume: Option<Decimal>,
    pub liquidity: Option<Decimal>,
}

/// Parses one gamma market object. Returns `None` (and logs) when the
/// required identifying field (`condition_id` / `conditionId`) is absent;
/// every other field degrades gracefully to `None`/defaults.
#[must_use]
pub fn parse_gamma_market(raw: &RawMarket, now: DateTime<Utc>) -> Option<ParsedGammaMarket> {
    let obj = raw.0.as_object()?;

    let condition_id = obj
        .get("conditionId")
        .or_else(|| obj.get("condition_id"))
        .and_then(Value::as_str)
        .map(ConditionId::from)?;

    let market_id = obj
        .get("id")
        .or_else(|| obj.get("marketId"))
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string())));

    let event_id = obj
        .get("eventId")
        .or_else(|| obj.get("event_id"))
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string())))
        .map(EventId::from);

    let slug = obj.get("slug").and_then(Value::as_str).map(str::to_string);

    let question = obj
        .get("question")
        .or_else(|| obj.get("title"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tag_ids = obj
        .get("tagIds")
        .or_else(|| obj.get("tag_ids"))
        .map(|v| {
            string_array_or_encoded_string(v)
                .into_iter()
                .filter_map(|s| s.parse::<i64>().ok())
                .collect()
        })
        .unwrap_or_default();

    let neg_risk = neg_risk_from_object(obj);

    let outcome_labels = obj
        .get("outcomes")
        .map(string_array_or_encoded_string)
        .unwrap_or_default();

    let token_ids = obj
        .get("clobTokenIds")
        .or_else(|| obj.get("tokenIds"))
        .or_else(|| obj.get("token_ids"))
        .map(string_array_or_encoded_string)
        .unwrap_or_default();

    let outcomes = outcome_labels
        .into_iter()
        .zip(token_ids.into_iter().map(TokenId::from).map(Some).chain(std::iter::repeat(None)))
        .map(|(label, token_id)| Outcome::new(label, token_id.unwrap_or_else(|| TokenId::from(""))))
        .filter(|o| !o.token_id().as_str().is_empty())
        .collect::<Vec<_>>();

    if outcomes.is_empty() {
        debug!(%condition_id, "gamma market has no resolvable outcomes, keeping bare shell");
    }

    let start_time = obj
        .get("startDate")
        .or_else(|| obj.get("startTime"))
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let end_time = obj
        .get("endDate")
        .or_else(|| obj.get("endTime"))
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let mut market = Market::new(condition_id, question, outcomes, neg_risk, now);
    if let Some(market_id) = market_id {
        market.set_market_id(market_id);
    }
    if let Some(event_id) = event_id {
        market.set_event_id(event_id);
    }
    if let Some(slug) = slug {
        market.set_slug(slug);
    }
    market.set_tag_ids(tag_ids);
    market.set_start_time(start_time);
    market.set_end_time(end_time);

    let volume = obj
        .get("volumeNum")
        .or_else(|| obj.get("volume"))
        .and_then(value_to_decimal);
    let liquidity = obj
        .get("liquidityNum")
        .or_else(|| obj.get("liquidity"))
        .and_then(value_to_decimal);

    Some(ParsedGammaMarket { market, volume, liquidity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_binary_market_with_string_encoded_arrays() {
        let raw = RawMarket(json!({
            "conditionId": "0xabc",
            "question": "Will it rain?",
            "outcomes": "[\"Yes\",\"No\"]",
            "clobTokenIds": "[\"111\",\"222\"]",
            "negRisk": false,
            "volume": "12345.6",
        }));
        let parsed = parse_gamma_market(&raw, Utc::now()).unwrap();
        assert!(parsed.market.is_well_formed());
        assert_eq!(parsed.volume, Some(Decimal::new(123456, 1)));
    }

    #[test]
    fn missing_condition_id_is_dropped() {
        let raw = RawMarket(json!({"question": "no id here"}));
        assert!(parse_gamma_market(&raw, Utc::now()).is_none());
    }
}
