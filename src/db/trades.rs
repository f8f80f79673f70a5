//! Idempotent trade insertion and wallet observation (§4.C, §4.H).

use diesel::prelude::*;

use super::model::{TradeRow, NewTradeRow};
use super::schema::trades::dsl::{self as trades_dsl, trades};
use super::DbConnection;
use crate::domain::Trade;
use crate::error::{Error, Result};

/// Inserts a trade if its key is not already present. Returns `true` when a
/// new row was written, `false` when the insert was a no-op due to a key
/// collision (§3, §4.C, §7 "ConstraintCollision").
pub fn insert_if_new(conn: &mut DbConnection, trade: &Trade) -> Result<bool> {
    let row = NewTradeRow::from(trade);
    let inserted = diesel::insert_into(trades)
        .values(&row)
        .on_conflict(trades_dsl::trade_key)
        .do_nothing()
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(inserted > 0)
}

/// Loads trades at or after `since`, used by the trade signal engine to scan
/// newly-persisted trades (§4.H, §5 "safety window" tolerance for reordering).
pub fn load_since(conn: &mut DbConnection, since: chrono::DateTime<chrono::Utc>) -> Result<Vec<Trade>> {
    let rows: Vec<TradeRow> = trades
        .filter(trades_dsl::trade_ts.ge(since.to_rfc3339()))
        .order(trades_dsl::trade_ts.asc())
        .load(conn)
        .map_err(Error::Database)?;
    Ok(rows.into_iter().map(TradeRow::into_domain).collect())
}

/// Sum of `notional_usd` for a wallet's trades with `trade_ts` within the
/// last 7 days of `now`, used to refresh `last_7d_notional_usd`.
pub fn sum_notional_last_7d(
    conn: &mut DbConnection,
    address: &crate::domain::WalletId,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<rust_decimal::Decimal> {
    let cutoff = now - chrono::Duration::days(7);
    let rows: Vec<TradeRow> = trades
        .filter(trades_dsl::wallet.eq(address.as_str()))
        .filter(trades_dsl::trade_ts.ge(cutoff.to_rfc3339()))
        .load(conn)
        .map_err(Error::Database)?;
    Ok(rows
        .into_iter()
        .map(TradeRow::into_domain)
        .map(|t| t.notional_usd())
        .sum())
}
