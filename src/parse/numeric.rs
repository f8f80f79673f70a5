//! Shared helpers for absorbing upstream schema drift (§4.B).

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Accepts a JSON number or a numeric string, deserializing either to `Decimal`.
pub fn decimal_from_string_or_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_decimal(&value).ok_or_else(|| serde::de::Error::custom("expected numeric value"))
}

/// Same as [`decimal_from_string_or_number`] but tolerates a missing field.
pub fn optional_decimal_from_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_to_decimal(&v)))
}

#[must_use]
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Accepts a JSON array, or a JSON-encoded string containing an array, of
/// strings (used for `outcomes`, `outcomePrices`, `token_ids` — upstreams
/// disagree on whether these are arrays or stringified arrays).
#[must_use]
pub fn string_array_or_encoded_string(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(raw) => serde_json::from_str::<Vec<String>>(raw)
            .or_else(|_| serde_json::from_str::<Vec<Value>>(raw).map(|items| {
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect()
            }))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Normalizes the several spellings upstreams use for the negative-risk flag.
#[must_use]
pub fn neg_risk_from_object(obj: &serde_json::Map<String, Value>) -> bool {
    for key in ["neg_risk", "negRisk", "is_neg_risk", "negative_risk"] {
        if let Some(value) = obj.get(key) {
            if let Some(b) = value.as_bool() {
                return b;
            }
            if let Some(s) = value.as_str() {
                return s.eq_ignore_ascii_case("true");
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_to_decimal_accepts_string_and_number() {
        assert_eq!(value_to_decimal(&json!("1.50")), Some(Decimal::new(150, 2)));
        assert_eq!(value_to_decimal(&json!(1.5)), Some(Decimal::new(15, 1)));
    }

    #[test]
    fn string_array_or_encoded_string_handles_both_shapes() {
        assert_eq!(
            string_array_or_encoded_string(&json!(["Yes", "No"])),
            vec!["Yes".to_string(), "No".to_string()]
        );
        assert_eq!(
            string_array_or_encoded_string(&json!("[\"Yes\",\"No\"]")),
            vec!["Yes".to_string(), "No".to_string()]
        );
    }

    #[test]
    fn neg_risk_from_object_checks_known_aliases() {
        let obj = json!({"negRisk": true}).as_object().cloned().unwrap();
        assert!(neg_risk_from_object(&obj));
        let obj = json!({}).as_object().cloned().unwrap();
        assert!(!neg_risk_from_object(&obj));
    }
}
