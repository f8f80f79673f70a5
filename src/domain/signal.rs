//! Signal events — the append-only output of the two signal engines (§3, §4.H, §4.I).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::ids::{ConditionId, Wallet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    LargeTakerTrade,
    LargeNewWalletTrade,
    DormantWalletReactivation,
    ArbBuyBoth,
    NewMarket,
}

impl SignalType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LargeTakerTrade => "LARGE_TAKER_TRADE",
            Self::LargeNewWalletTrade => "LARGE_NEW_WALLET_TRADE",
            Self::DormantWalletReactivation => "DORMANT_WALLET_REACTIVATION",
            Self::ArbBuyBoth => "ARB_BUY_BOTH",
            Self::NewMarket => "NEW_MARKET",
        }
    }
}

impl FromStr for SignalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LARGE_TAKER_TRADE" => Ok(Self::LargeTakerTrade),
            "LARGE_NEW_WALLET_TRADE" => Ok(Self::LargeNewWalletTrade),
            "DORMANT_WALLET_REACTIVATION" => Ok(Self::DormantWalletReactivation),
            "ARB_BUY_BOTH" => Ok(Self::ArbBuyBoth),
            "NEW_MARKET" => Ok(Self::NewMarket),
            _ => Err(()),
        }
    }
}

/// Severity on a 1-5 scale; always constructed through [`Severity::clamp`]
/// so callers can never accidentally persist an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Severity(u8);

impl Severity {
    #[must_use]
    pub fn clamp(value: i32) -> Self {
        Self(value.clamp(1, 5) as u8)
    }

    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// One row in the append-only signal log. Constructed by the signal engines,
/// persisted by storage with `dedupe_key` enforced unique (§4.C).
#[derive(Debug, Clone)]
pub struct SignalEvent {
    signal_type: SignalType,
    dedupe_key: String,
    created_at: DateTime<Utc>,
    severity: Severity,
    wallet: Option<Wallet>,
    condition_id: Option<ConditionId>,
    payload: Value,
}

impl SignalEvent {
    #[must_use]
    pub fn new(
        signal_type: SignalType,
        dedupe_key: impl Into<String>,
        created_at: DateTime<Utc>,
        severity: Severity,
        wallet: Option<Wallet>,
        condition_id: Option<ConditionId>,
        payload: Value,
    ) -> Self {
        Self {
            signal_type,
            dedupe_key: dedupe_key.into(),
            created_at,
            severity,
            wallet,
            condition_id,
            payload,
        }
    }

    #[must_use]
    pub const fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    #[must_use]
    pub fn dedupe_key(&self) -> &str {
        &self.dedupe_key
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub const fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    #[must_use]
    pub const fn condition_id(&self) -> Option<&ConditionId> {
        self.condition_id.as_ref()
    }

    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// `notification_key = signal_type + ':' + (wallet | condition_id)` (§4.J step 2).
    #[must_use]
    pub fn notification_key(&self) -> String {
        let principal = self
            .wallet
            .as_ref()
            .map(Wallet::as_str)
            .or_else(|| self.condition_id.as_ref().map(ConditionId::as_str))
            .unwrap_or("unknown");
        format!("{}:{}", self.signal_type.as_str(), principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_clamps_to_1_5() {
        assert_eq!(Severity::clamp(0).get(), 1);
        assert_eq!(Severity::clamp(-3).get(), 1);
        assert_eq!(Severity::clamp(6).get(), 5);
        assert_eq!(Severity::clamp(3).get(), 3);
    }

    #[test]
    fn notification_key_prefers_wallet_over_condition() {
        let ev = SignalEvent::new(
            SignalType::LargeTakerTrade,
            "k1",
            Utc::now(),
            Severity::clamp(2),
            Some(Wallet::from("0xA")),
            Some(ConditionId::from("0xB")),
            serde_json::json!({}),
        );
        assert_eq!(ev.notification_key(), "LARGE_TAKER_TRADE:0xA");
    }

    #[test]
    fn notification_key_falls_back_to_condition_id() {
        let ev = SignalEvent::new(
            SignalType::ArbBuyBoth,
            "k2",
            Utc::now(),
            Severity::clamp(3),
            None,
            Some(ConditionId::from("0xB")),
            serde_json::json!({}),
        );
        assert_eq!(ev.notification_key(), "ARB_BUY_BOTH:0xB");
    }
}
