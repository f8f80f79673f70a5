//! Alert delivery log: writes and the dedupe-window lookup (§4.C, §4.J, §8).

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::model::AlertLogRow;
use super::schema::alert_log::dsl::*;
use super::DbConnection;
use crate::domain::{AlertLogEntry, DeliveryStatus, Severity};
use crate::error::{Error, Result};

/// Records one delivery attempt.
pub fn record(conn: &mut DbConnection, entry: &AlertLogEntry) -> Result<()> {
    let row = AlertLogRow::from(entry);
    diesel::insert_into(alert_log)
        .values(&row)
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(())
}

/// The most recent `SENT` delivery for `(channel, notification_key)` within
/// `window_secs` of `now`, if any — used to decide suppression (§4.J step 3).
pub fn most_recent_sent_within_window(
    conn: &mut DbConnection,
    channel_name: &str,
    key: &str,
    now: DateTime<Utc>,
    window_secs: i64,
) -> Result<Option<(DateTime<Utc>, Severity)>> {
    let cutoff = now - chrono::Duration::seconds(window_secs);

    let row: Option<AlertLogRow> = alert_log
        .filter(channel.eq(channel_name))
        .filter(notification_key.eq(key))
        .filter(status.eq(DeliveryStatus::Sent.as_str()))
        .filter(sent_at.ge(cutoff.to_rfc3339()))
        .order(sent_at.desc())
        .first(conn)
        .optional()
        .map_err(Error::Database)?;

    let Some(row) = row else { return Ok(None) };

    use super::schema::signal_events::dsl as signal_dsl;
    let prior_severity: i32 = signal_dsl::signal_events
        .filter(signal_dsl::id.eq(row.signal_event_id))
        .select(signal_dsl::severity)
        .first(conn)
        .map_err(Error::Database)?;

    let sent_at_parsed = DateTime::parse_from_rfc3339(&row.sent_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    Ok(Some((sent_at_parsed, Severity::clamp(prior_severity))))
}
