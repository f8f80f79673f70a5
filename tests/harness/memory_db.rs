use marketwatch::db::{create_pool, DbConnection, DbPool};

/// A single-connection pool over an in-process sqlite `:memory:` database,
/// migrated and ready to use. Capped at one connection so every test keeps
/// talking to the same in-memory database rather than getting a fresh,
/// empty one from the pool.
pub struct MemoryDb {
    pool: DbPool,
}

impl MemoryDb {
    pub fn create() -> Self {
        let pool = create_pool(":memory:", 1).expect("create in-memory sqlite pool");
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn conn(&self) -> DbConnection {
        self.pool.get().expect("get pooled connection")
    }
}
