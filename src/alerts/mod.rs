//! Alert dispatcher (§4.J): reads undispatched `SignalEvent`s, evaluates
//! routing rules, dedupes against recent deliveries, and delivers through
//! one or more channel drivers with retry-with-backoff.

pub mod channel;

use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};

use crate::config::AlertConfig;
use crate::db::{self, DbConnection};
use crate::domain::{AlertLogEntry, DeliveryStatus, SignalEvent};
use crate::error::Result;

pub use channel::{build_channels, ChannelDriver, FormattedAlert};

/// A rule gates which channels a signal is routed to, in declared order
/// (§4.J step 1). The first matching rule wins; channels not named by any
/// matching rule still receive the signal if `channels` is empty (meaning
/// "all enabled channels").
pub struct Rule {
    pub signal_types: Vec<&'static str>,
    pub min_severity: u8,
    pub channels: Vec<crate::config::ChannelKind>,
}

impl Rule {
    fn matches(&self, event: &SignalEvent) -> bool {
        let type_ok = self.signal_types.is_empty() || self.signal_types.contains(&event.signal_type().as_str());
        type_ok && event.severity().get() >= self.min_severity
    }
}

/// Default routing: everything goes to every configured channel above the
/// global `min_severity` floor. Operators needing finer routing add rules
/// ahead of this one.
#[must_use]
pub fn default_rules(config: &AlertConfig) -> Vec<Rule> {
    vec![Rule { signal_types: Vec::new(), min_severity: config.min_severity, channels: Vec::new() }]
}

fn format_message(event: &SignalEvent) -> String {
    let principal = event
        .wallet()
        .map(|w| format!("wallet {}", w.as_str()))
        .or_else(|| event.condition_id().map(|c| format!("market {}", c.as_str())))
        .unwrap_or_default();

    format!(
        "[sev {}] {} — {} — /signals/{}",
        event.severity().get(),
        event.signal_type().as_str(),
        principal,
        event.dedupe_key()
    )
}

/// Runs one dispatch pass: evaluates every undispatched signal against the
/// rule set, applies the dedupe-window suppression check, and delivers to
/// matching channels (§4.J).
pub async fn run(
    conn: &mut DbConnection,
    config: &AlertConfig,
    rules: &[Rule],
    channels: &[Box<dyn ChannelDriver>],
) -> Result<usize> {
    let candidates = db::signals::load_undispatched(conn)?;
    let mut delivered = 0;

    for (signal_event_id, event) in candidates {
        if !config.enabled {
            continue;
        }

        let Some(rule) = rules.iter().find(|r| r.matches(&event)) else { continue };
        let targets: Vec<&Box<dyn ChannelDriver>> = if rule.channels.is_empty() {
            channels.iter().collect()
        } else {
            channels.iter().filter(|c| rule.channels.contains(&c.kind())).collect()
        };

        let notification_key = event.notification_key();
        let now = Utc::now();

        for driver in targets {
            let channel_name = channel_name(driver.kind());
            let suppressed = db::alerts::most_recent_sent_within_window(
                conn,
                channel_name,
                &notification_key,
                now,
                config.dedup_window_secs,
            )?
            .is_some_and(|(_, prior_severity)| event.severity() <= prior_severity);

            if suppressed {
                let entry = AlertLogEntry::new(signal_event_id, channel_name, notification_key.clone(), now, DeliveryStatus::Suppressed, None);
                db::alerts::record(conn, &entry)?;
                continue;
            }

            let formatted = FormattedAlert { text: format_message(&event), severity: event.severity().get(), signal_type: event.signal_type().as_str() };
            match deliver_with_retry(driver.as_ref(), &formatted, config.max_delivery_attempts).await {
                Ok(()) => {
                    let entry = AlertLogEntry::new(signal_event_id, channel_name, notification_key.clone(), now, DeliveryStatus::Sent, None);
                    db::alerts::record(conn, &entry)?;
                    delivered += 1;
                }
                Err(err) => {
                    error!(channel = channel_name, error = %err, "alert delivery failed after retries");
                    let entry = AlertLogEntry::new(signal_event_id, channel_name, notification_key.clone(), now, DeliveryStatus::Failed, Some(err.to_string()));
                    db::alerts::record(conn, &entry)?;
                }
            }
        }
    }

    Ok(delivered)
}

fn channel_name(kind: crate::config::ChannelKind) -> &'static str {
    match kind {
        crate::config::ChannelKind::Log => "log",
        crate::config::ChannelKind::Slack => "slack",
        crate::config::ChannelKind::Telegram => "telegram",
        crate::config::ChannelKind::Email => "email",
    }
}

async fn deliver_with_retry(driver: &dyn ChannelDriver, alert: &FormattedAlert, max_attempts: u32) -> Result<()> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match driver.send(alert).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < max_attempts => {
                warn!(attempt, error = %err, "alert delivery attempt failed, retrying");
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Severity, SignalType};

    fn sample_event(severity: i32) -> SignalEvent {
        SignalEvent::new(SignalType::ArbBuyBoth, "k", Utc::now(), Severity::clamp(severity), None, None, serde_json::json!({}))
    }

    #[test]
    fn rule_filters_by_min_severity() {
        let rule = Rule { signal_types: Vec::new(), min_severity: 3, channels: Vec::new() };
        assert!(!rule.matches(&sample_event(2)));
        assert!(rule.matches(&sample_event(3)));
    }

    #[test]
    fn rule_filters_by_signal_type() {
        let rule = Rule { signal_types: vec!["LARGE_TAKER_TRADE"], min_severity: 1, channels: Vec::new() };
        assert!(!rule.matches(&sample_event(5)));
    }
}
