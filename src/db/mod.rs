//! Storage layer: idempotent upserts, time-series snapshots, the
//! latest-orderbook audit store, and the signal/alert log (§4.C).

pub mod alerts;
pub mod config_store;
pub mod markets;
pub mod model;
pub mod orderbooks;
pub mod schema;
pub mod signals;
pub mod snapshots;
pub mod trades;
pub mod wallets;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates a connection pool for the given database URL and runs any
/// pending migrations against it.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(Error::Pool)?;

    let mut conn = pool.get().map_err(Error::Pool)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Migration(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_pool_with_memory_db_runs_migrations() {
        let pool = create_pool(":memory:", 1);
        assert!(pool.is_ok());
    }
}
