//! Query executor types

use sqlx::PgPool;

/// Executes statements against the pool.
///
/// Raw statements run as-is. Structured statements (the insert and the
/// bootstrap DDL) are scoped to the one table the executor was built for.
pub struct QueryExecutor {
    pub(super) pool: PgPool,
    pub(super) table: String,
}

impl QueryExecutor {
    pub fn new(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }
}
