//! Periodic flush of the in-memory orderbook cache for audit/UI (§3, §4.D).
//!
//! `OrderbookLatest` is mastered in memory; this table is a read-mostly
//! mirror, kept fresh by the owning job rather than on every mutation.

use diesel::prelude::*;

use super::model::OrderbookRow;
use super::schema::orderbook_latest::dsl::*;
use super::DbConnection;
use crate::domain::{OrderbookLatest, TokenId};
use crate::error::{Error, Result};

/// Replaces the stored row for one token with the cache's current view.
pub fn flush_one(conn: &mut DbConnection, book: &OrderbookLatest) -> Result<()> {
    let row = OrderbookRow::from(book);
    diesel::insert_into(orderbook_latest)
        .values(&row)
        .on_conflict(token_id)
        .do_update()
        .set(&row)
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(())
}

/// Reads the highest-`as_of` persisted row for a token, used by the REST
/// fallback path when the in-memory cache has no entry yet (§4.C: "reads of
/// latest snapshot / latest book for token return the highest-as_of row").
pub fn load(conn: &mut DbConnection, id: &TokenId) -> Result<Option<OrderbookLatest>> {
    let row: Option<OrderbookRow> = orderbook_latest
        .filter(token_id.eq(id.as_str()))
        .order(as_of.desc())
        .first(conn)
        .optional()
        .map_err(Error::Database)?;
    Ok(row.map(OrderbookRow::into_domain))
}
