//! Alert delivery records (§3, §4.J).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Suppressed,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Failed => "FAILED",
            Self::Suppressed => "SUPPRESSED",
        }
    }
}

/// One row per delivery attempt of a signal to a channel.
#[derive(Debug, Clone)]
pub struct AlertLogEntry {
    signal_event_id: i64,
    channel: String,
    notification_key: String,
    sent_at: DateTime<Utc>,
    status: DeliveryStatus,
    error: Option<String>,
}

impl AlertLogEntry {
    #[must_use]
    pub fn new(
        signal_event_id: i64,
        channel: impl Into<String>,
        notification_key: impl Into<String>,
        sent_at: DateTime<Utc>,
        status: DeliveryStatus,
        error: Option<String>,
    ) -> Self {
        Self {
            signal_event_id,
            channel: channel.into(),
            notification_key: notification_key.into(),
            sent_at,
            status,
            error,
        }
    }

    #[must_use]
    pub const fn signal_event_id(&self) -> i64 {
        self.signal_event_id
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn notification_key(&self) -> &str {
        &self.notification_key
    }

    #[must_use]
    pub const fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    #[must_use]
    pub const fn status(&self) -> DeliveryStatus {
        self.status
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
