//! In-process metrics snapshot (§6, AMBIENT.3).
//!
//! Job status, HTTP pool counters and websocket connection state already
//! live next to the components that produce them
//! ([`crate::scheduler::Scheduler::status_snapshot`], [`crate::http::HttpPool::stats`],
//! [`crate::exchange::polymarket::WebsocketConsumer::state`]). Signal counts
//! by type are read back from `signal_events` rather than tracked in a
//! separate in-process counter, so a process restart doesn't reset the hour
//! the status page is looking at. This module just assembles the one view
//! the status page renders.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db;
use crate::db::DbConnection;
use crate::error::Result;
use crate::exchange::polymarket::{ConsumerState, WebsocketConsumer};
use crate::http::HttpPool;
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Serialize)]
pub struct JobMetric {
    pub name: &'static str,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub running: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpMetric {
    pub requests_total: u64,
    pub errors_total: u64,
    pub throttled_total: u64,
    pub last_request_duration_ms: u64,
    pub last_request_at_unix: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebsocketMetric {
    pub state: &'static str,
    pub subscribed_tokens: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalCountEntry {
    pub signal_type: String,
    pub hour_bucket_unix: i64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub jobs: Vec<JobMetric>,
    pub http: HttpMetric,
    pub websocket: WebsocketMetric,
    pub signal_counts_last_24h: Vec<SignalCountEntry>,
}

fn consumer_state_str(state: ConsumerState) -> &'static str {
    match state {
        ConsumerState::Disconnected => "disconnected",
        ConsumerState::Connecting => "connecting",
        ConsumerState::Subscribing => "subscribing",
        ConsumerState::Live => "live",
        ConsumerState::Draining => "draining",
    }
}

fn hour_bucket(ts: DateTime<Utc>) -> i64 {
    let unix = ts.timestamp();
    unix - unix.rem_euclid(3600)
}

/// Assembles the full metrics snapshot. `conn` is used only for the signal
/// count query; everything else is read from in-memory state the caller
/// already owns.
pub fn snapshot(
    conn: &mut DbConnection,
    scheduler: &Scheduler,
    http: &HttpPool,
    websocket: &WebsocketConsumer,
) -> Result<MetricsSnapshot> {
    let jobs = scheduler
        .status_snapshot()
        .into_iter()
        .map(|(name, status)| JobMetric {
            name,
            last_success_at: status.last_success_at,
            last_failure_at: status.last_failure_at,
            last_error: status.last_error,
            running: status.running,
        })
        .collect();

    let stats = http.stats();
    let http_metric = HttpMetric {
        requests_total: stats.requests_total.load(Ordering::Relaxed),
        errors_total: stats.errors_total.load(Ordering::Relaxed),
        throttled_total: stats.throttled_total.load(Ordering::Relaxed),
        last_request_duration_ms: stats.last_request_duration_ms.load(Ordering::Relaxed),
        last_request_at_unix: stats.last_request_at_unix.load(Ordering::Relaxed),
    };

    let websocket_metric =
        WebsocketMetric { state: consumer_state_str(websocket.state()), subscribed_tokens: websocket.subscribed_count() };

    let signal_counts_last_24h = signal_counts_last_24h(conn, Utc::now())?;

    Ok(MetricsSnapshot { jobs, http: http_metric, websocket: websocket_metric, signal_counts_last_24h })
}

fn signal_counts_last_24h(conn: &mut DbConnection, now: DateTime<Utc>) -> Result<Vec<SignalCountEntry>> {
    let since = now - chrono::Duration::hours(24);
    let rows = db::signals::type_and_time_since(conn, since)?;

    let mut buckets: HashMap<(String, i64), u64> = HashMap::new();
    for (signal_type, created_at) in rows {
        *buckets.entry((signal_type, hour_bucket(created_at))).or_insert(0) += 1;
    }

    let mut entries: Vec<SignalCountEntry> = buckets
        .into_iter()
        .map(|((signal_type, hour_bucket_unix), count)| SignalCountEntry { signal_type, hour_bucket_unix, count })
        .collect();
    entries.sort_by_key(|e| (e.hour_bucket_unix, e.signal_type.clone()));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_bucket_truncates_to_the_hour() {
        let a = DateTime::parse_from_rfc3339("2026-07-30T12:14:59Z").unwrap().with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2026-07-30T12:59:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(hour_bucket(a), hour_bucket(b));

        let c = DateTime::parse_from_rfc3339("2026-07-30T13:00:00Z").unwrap().with_timezone(&Utc);
        assert_ne!(hour_bucket(a), hour_bucket(c));
    }

    #[test]
    fn consumer_state_str_covers_every_variant() {
        assert_eq!(consumer_state_str(ConsumerState::Disconnected), "disconnected");
        assert_eq!(consumer_state_str(ConsumerState::Live), "live");
        assert_eq!(consumer_state_str(ConsumerState::Draining), "draining");
    }
}
