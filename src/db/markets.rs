//! Market upserts and new-market discovery (§4.C, §4.G).

use diesel::prelude::*;

use super::model::MarketRow;
use super::schema::markets::dsl::*;
use super::DbConnection;
use crate::domain::{ConditionId, Market};
use crate::error::{Error, Result};

/// Upserts a batch of observed markets and returns the `condition_id`s that
/// were not already present — consumed by `sync_gamma_events` to emit
/// `NEW_MARKET` signals (§4.C, §4.G).
pub fn upsert_batch(conn: &mut DbConnection, observed: &[Market]) -> Result<Vec<ConditionId>> {
    let existing: Vec<String> = markets.select(condition_id).load(conn).map_err(Error::Database)?;
    let existing: std::collections::HashSet<String> = existing.into_iter().collect();

    let mut newly_discovered = Vec::new();

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        for market in observed {
            let row = MarketRow::from(market);
            if !existing.contains(&row.condition_id) {
                newly_discovered.push(market.condition_id().clone());
            }
            diesel::insert_into(markets)
                .values(&row)
                .on_conflict(condition_id)
                .do_update()
                .set(&row)
                .execute(conn)?;
        }
        Ok(())
    })
    .map_err(Error::Database)?;

    Ok(newly_discovered)
}

/// Fetches every market currently known to storage.
pub fn load_all(conn: &mut DbConnection) -> Result<Vec<Market>> {
    let rows: Vec<MarketRow> = markets.load(conn).map_err(Error::Database)?;
    Ok(rows.into_iter().map(MarketRow::into_domain).collect())
}

/// Fetches one market by id, if known.
pub fn find(conn: &mut DbConnection, id: &ConditionId) -> Result<Option<Market>> {
    let row: Option<MarketRow> = markets
        .filter(condition_id.eq(id.as_str()))
        .first(conn)
        .optional()
        .map_err(Error::Database)?;
    Ok(row.map(MarketRow::into_domain))
}
