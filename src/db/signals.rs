//! Signal event insertion with dedupe-key uniqueness (§4.C, §4.J, §8).

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::model::{NewSignalEventRow, SignalEventRow};
use super::schema::signal_events::dsl::*;
use super::DbConnection;
use crate::domain::SignalEvent;
use crate::error::{Error, Result};

/// Result of attempting to insert a signal event.
pub enum InsertOutcome {
    Inserted(i64),
    AlreadyEmitted,
}

/// Inserts a signal event. A `dedupe_key` collision is not an error — it
/// means this exact signal was already emitted (§4.C, §8).
pub fn insert(conn: &mut DbConnection, event: &SignalEvent) -> Result<InsertOutcome> {
    let row = NewSignalEventRow::from(event);
    let inserted = diesel::insert_into(signal_events)
        .values(&row)
        .on_conflict(dedupe_key)
        .do_nothing()
        .execute(conn)
        .map_err(Error::Database)?;

    if inserted == 0 {
        return Ok(InsertOutcome::AlreadyEmitted);
    }

    let new_id: i64 = signal_events
        .filter(dedupe_key.eq(&row.dedupe_key))
        .select(id)
        .first(conn)
        .map_err(Error::Database)?;
    Ok(InsertOutcome::Inserted(new_id))
}

/// Signal events that have no prior `SENT` row in `alert_log`, read by the
/// alert dispatcher (§4.J).
pub fn load_undispatched(conn: &mut DbConnection) -> Result<Vec<(i64, SignalEvent)>> {
    use super::schema::alert_log::dsl as alert_dsl;

    let dispatched: Vec<i64> = alert_dsl::alert_log
        .filter(alert_dsl::status.eq("SENT"))
        .select(alert_dsl::signal_event_id)
        .load(conn)
        .map_err(Error::Database)?;

    let rows: Vec<SignalEventRow> = signal_events
        .filter(id.ne_all(dispatched))
        .order(created_at.asc())
        .load(conn)
        .map_err(Error::Database)?;

    Ok(rows.into_iter().map(SignalEventRow::into_domain).collect())
}

/// Per-type counts since `since`, for the metrics snapshot (§6). Hour
/// bucketing is done by the caller; this just returns `(signal_type,
/// created_at)` pairs for everything in the window.
pub fn type_and_time_since(conn: &mut DbConnection, since: DateTime<Utc>) -> Result<Vec<(String, DateTime<Utc>)>> {
    let rows: Vec<(String, String)> = signal_events
        .filter(created_at.ge(since.to_rfc3339()))
        .select((signal_type, created_at))
        .load(conn)
        .map_err(Error::Database)?;

    Ok(rows
        .into_iter()
        .filter_map(|(kind, ts)| DateTime::parse_from_rfc3339(&ts).ok().map(|t| (kind, t.with_timezone(&Utc))))
        .collect())
}
