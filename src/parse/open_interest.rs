//! Normalizes the open-interest upstream payload shape (§4.B, §4.G).

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::ConditionId;
use crate::parse::numeric::value_to_decimal;

/// One `{market, value}` entry from the open-interest endpoint.
pub struct OpenInterestEntry {
    pub condition_id: ConditionId,
    pub value: Decimal,
}

/// Parses the open-interest response body (a JSON array of `{market,
/// value}` objects), dropping entries missing either field.
#[must_use]
pub fn parse_open_interest(body: &Value) -> Vec<OpenInterestEntry> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let obj = item.as_object()?;
                    let condition_id = obj
                        .get("market")
                        .or_else(|| obj.get("conditionId"))
                        .and_then(Value::as_str)
                        .map(ConditionId::from)?;
                    let value = obj.get("value").and_then(value_to_decimal)?;
                    Some(OpenInterestEntry { condition_id, value })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_array_of_entries_and_drops_malformed() {
        let body = json!([
            {"market": "0xa", "value": "1234.5"},
            {"market": "0xb"},
        ]);
        let entries = parse_open_interest(&body);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].condition_id.as_str(), "0xa");
    }
}
