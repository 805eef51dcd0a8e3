use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tablegate::{create_router, AppConfig, AppState};

/// Tablegate Server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Table served by the gateway
    #[arg(long, env = "DB_TABLE", default_value = "patients")]
    table: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tablegate server");

    let config = load_config(&args);

    // Create application state
    let state = AppState::new(config.clone()).await?;

    // Create router
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("Invalid server address")?;

    info!(table = %config.table, "Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Compose the configuration from CLI arguments and environment.
///
/// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
/// discrete `DB_*` variables with local-development defaults.
fn load_config(args: &Args) -> AppConfig {
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
        let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
        let password = env::var("DB_PASSWORD").unwrap_or_default();
        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let name = env::var("DB_NAME").unwrap_or_else(|_| "tablegate".to_string());

        if password.is_empty() {
            format!("postgres://{user}@{host}:{port}/{name}")
        } else {
            format!("postgres://{user}:{password}@{host}:{port}/{name}")
        }
    });

    AppConfig {
        server_host: args.host.clone(),
        server_port: args.port,
        database_url,
        table: args.table.clone(),
    }
}
