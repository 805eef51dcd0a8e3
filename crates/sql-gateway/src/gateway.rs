use anyhow::{bail, Result};
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::admission::SqlCommand;
use crate::executor::QueryExecutor;

/// Configuration for a [`TableGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    table: String,
}

impl GatewayConfig {
    /// Build a configuration serving the given table.
    ///
    /// The table name is interpolated into the bootstrap DDL and the insert
    /// statement, so it must be a bare identifier: an ASCII letter or
    /// underscore followed by ASCII letters, digits and underscores.
    pub fn new(table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        if !is_bare_identifier(&table) {
            bail!("invalid table name: {table:?}");
        }
        Ok(Self { table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Gateway serving one table over a PostgreSQL pool.
///
/// Raw statements arrive as [`SqlCommand`] values, which can only be built
/// through the admission check. Structured inserts never touch raw SQL.
pub struct TableGateway {
    config: GatewayConfig,
    executor: QueryExecutor,
}

impl TableGateway {
    pub fn new(config: GatewayConfig, pool: PgPool) -> Self {
        let executor = QueryExecutor::new(pool, config.table().to_string());
        Self { config, executor }
    }

    pub fn table(&self) -> &str {
        self.config.table()
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<()> {
        self.executor.ensure_table().await
    }

    /// Run an admitted statement and return its rows as JSON objects.
    pub async fn run_command(&self, command: &SqlCommand) -> Result<Vec<serde_json::Value>> {
        self.executor.run_raw(command.as_str()).await
    }

    /// Insert one record through the parameter-bound statement, returning
    /// the generated id.
    pub async fn insert_record(&self, name: &str, date_of_birth: NaiveDate) -> Result<i32> {
        self.executor.insert_record(name, date_of_birth).await
    }
}
