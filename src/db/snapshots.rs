//! Append-only `MarketMetricSnapshot` storage and retention (§3, §4.C).

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::model::NewMetricSnapshotRow;
use super::schema::market_metrics_ts::dsl::*;
use super::DbConnection;
use crate::domain::MarketMetricSnapshot;
use crate::error::{Error, Result};

/// Appends a snapshot row. Never updates an existing row (§3: "append-only").
pub fn append(conn: &mut DbConnection, snapshot: &MarketMetricSnapshot) -> Result<()> {
    diesel::insert_into(market_metrics_ts)
        .values(NewMetricSnapshotRow::from(snapshot))
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(())
}

/// Reads the most recent snapshot for a market, used by the trade signal
/// engine's liquidity-floor severity bump (§4.H "Severity").
pub fn latest_for(conn: &mut DbConnection, id: &crate::domain::ConditionId) -> Result<Option<MarketMetricSnapshot>> {
    let row: Option<NewMetricSnapshotRow> = market_metrics_ts
        .filter(condition_id.eq(id.as_str()))
        .order(ts.desc())
        .select(NewMetricSnapshotRow::as_select())
        .first(conn)
        .optional()
        .map_err(Error::Database)?;
    Ok(row.map(NewMetricSnapshotRow::into_domain))
}

/// Deletes minutely rows older than `minutely_cutoff`. Callers are expected
/// to have already downsampled anything worth keeping past that point to
/// hourly granularity before calling this (§3 retention policy).
pub fn prune_older_than(conn: &mut DbConnection, minutely_cutoff: DateTime<Utc>) -> Result<usize> {
    let deleted = diesel::delete(market_metrics_ts.filter(ts.lt(minutely_cutoff.to_rfc3339())))
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(deleted)
}
