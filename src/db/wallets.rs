//! Wallet upserts (§3, §4.C, §4.H step 2).

use diesel::prelude::*;

use super::model::WalletRow;
use super::schema::wallets::dsl::*;
use super::DbConnection;
use crate::domain::{Wallet, WalletId};
use crate::error::{Error, Result};

/// Loads a wallet by address, if known.
pub fn find(conn: &mut DbConnection, target: &WalletId) -> Result<Option<Wallet>> {
    let row: Option<WalletRow> = wallets
        .filter(address.eq(target.as_str()))
        .first(conn)
        .optional()
        .map_err(Error::Database)?;
    Ok(row.map(WalletRow::into_domain))
}

/// Upserts a wallet's current state (§4.H step 2: "always update
/// `last_seen_at`" etc. — callers mutate the in-memory `Wallet` then call
/// this to persist the result).
pub fn upsert(conn: &mut DbConnection, wallet: &Wallet) -> Result<()> {
    let row = WalletRow::from(wallet);
    diesel::insert_into(wallets)
        .values(&row)
        .on_conflict(address)
        .do_update()
        .set(&row)
        .execute(conn)
        .map_err(Error::Database)?;
    Ok(())
}
