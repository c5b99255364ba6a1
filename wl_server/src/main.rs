//! Wallet ledger HTTP server.
//!
//! Serves wallet lookup, creation and balance operations backed by
//! PostgreSQL, or by the in-process store with `--memory`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use pico_args::Arguments;
use tracing::{info, warn};
use wallet_ledger::{
    db::{Database, MemoryWalletStore, PgWalletStore, WalletStore},
    wallet::WalletManager,
};
use wl_server::{
    api,
    config::{ServerConfig, StoreBackend},
    logging, metrics,
};

const HELP: &str = "\
Run the wallet ledger server

USAGE:
  wl_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --memory                 Keep wallets in process memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  DATABASE_URL             PostgreSQL connection string
  WALLET_STORE             'postgres' (default) or 'memory'
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUN_MIGRATIONS           Apply schema migrations on startup [default: true]
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let memory = pargs.contains("--memory");

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unknown arguments: {:?}", remaining);
    }

    let config = ServerConfig::from_env(bind, database_url, memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    let (store, database): (Arc<dyn WalletStore>, Option<Database>) = match config.store {
        StoreBackend::Memory => {
            warn!("Using in-memory wallet store; balances are lost on exit");
            let store: Arc<dyn WalletStore> = Arc::new(MemoryWalletStore::new());
            (store, None)
        }
        StoreBackend::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

            if config.run_migrations {
                db.migrate()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
                info!("Database migrations applied");
            }
            info!("Database connected successfully");

            let store: Arc<dyn WalletStore> = Arc::new(
                PgWalletStore::new(db.pool().clone())
                    .with_query_timeout(config.database.query_timeout()),
            );
            (store, Some(db))
        }
    };

    let state = api::AppState {
        wallet_manager: Arc::new(WalletManager::new(store)),
    };
    let app = api::create_router(state);

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
