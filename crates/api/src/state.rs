use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use tablegate_sql_gateway::{GatewayConfig, TableGateway};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub gateway: Arc<TableGateway>,
    pub config: Arc<AppConfig>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub table: String,
}

impl AppState {
    /// Connect the pool and bootstrap the served table.
    ///
    /// Fails fast: an unreachable database or a failing bootstrap statement
    /// aborts startup instead of surfacing as 500s later.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("Connected to PostgreSQL");

        let gateway = TableGateway::new(GatewayConfig::new(config.table.clone())?, pool.clone());
        gateway.ensure_table().await?;

        Ok(Self {
            pool,
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        })
    }
}
