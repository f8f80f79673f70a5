//! Newtype identifiers used across the domain layer.
//!
//! Keeping these as distinct types (rather than passing `String` everywhere)
//! makes it a compile error to pass a `TokenId` where a `ConditionId` is
//! expected, which is a mistake that is easy to make by accident when both
//! are hex strings originating from the same upstream payload.

use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(ConditionId, "Unique identifier of a market's resolution condition (0x-prefixed 64 hex).");
string_id!(TokenId, "Unique identifier of one outcome's tradeable position.");
string_id!(EventId, "Identifier of the parent event grouping related markets.");
string_id!(Wallet, "Canonical wallet address: proxy wallet when present, else the user/owner address.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_newtypes_round_trip_through_string() {
        let c = ConditionId::from("0xabc");
        let t = TokenId::from("0xabc".to_string());
        assert_eq!(c.as_str(), "0xabc");
        assert_eq!(t.as_str(), "0xabc");
        assert_eq!(c.to_string(), "0xabc");
    }
}
