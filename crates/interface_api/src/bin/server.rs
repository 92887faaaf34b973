//! Estate Ledger - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory storage, defaults
//! cargo run --bin estate-ledger-api
//!
//! # PostgreSQL with JSON logs
//! LEDGER_STORAGE=postgres LEDGER_DATABASE_URL=postgres://... LEDGER_LOG_FORMAT=json \
//!     cargo run --bin estate-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `LEDGER_HOST` / `LEDGER_PORT` - Listen address (default: 0.0.0.0:8080)
//! * `LEDGER_LOG_LEVEL` - Filter used when `RUST_LOG` is unset (default: info)
//! * `LEDGER_LOG_FORMAT` - `pretty` or `json`
//! * `LEDGER_STORAGE` - `memory` or `postgres`
//! * `LEDGER_DATABASE_URL` - PostgreSQL connection string
//! * `LEDGER_CURRENCY` - Ledger currency code (default: USD)
//! * `LEDGER_BILLING__RECEIVABLE_ACCOUNT`, `LEDGER_BILLING__FUND_ACCOUNT`,
//!   `LEDGER_BILLING__GRACE_DAYS`, `LEDGER_BILLING__CONCURRENCY`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_billing::{BillingStore, InMemoryBillingStore};
use domain_ledger::{EstateChartOfAccounts, Ledger, LedgerStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgBillingStore, PgLedgerStore};
use interface_api::config::{AppConfig, LogFormat, StorageBackend};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid LEDGER_* configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        currency = %config.currency,
        "Starting estate ledger API"
    );

    let state = build_state(&config).await?;

    let seeded = state
        .ledger
        .registry()
        .seed_chart(EstateChartOfAccounts::create_standard_accounts())
        .await
        .context("failed to seed the chart of accounts")?;
    tracing::info!(seeded, "Standard chart of accounts ready");

    let app = create_router(state);
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wires the ledger and billing stores for the configured backend
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (ledger_store, billing_store): (Arc<dyn LedgerStore>, Arc<dyn BillingStore>) =
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                let ledger_store: Arc<dyn LedgerStore> =
                    Arc::new(domain_ledger::InMemoryLedgerStore::new());
                let billing_store: Arc<dyn BillingStore> =
                    Arc::new(InMemoryBillingStore::new(ledger_store.clone()));
                (ledger_store, billing_store)
            }
            StorageBackend::Postgres => {
                let pool = create_pool(DatabaseConfig::new(config.database_url.clone()))
                    .await
                    .context("failed to connect to PostgreSQL")?;
                run_migrations(&pool).await.context("failed to run migrations")?;
                (
                    Arc::new(PgLedgerStore::new(pool.clone())),
                    Arc::new(PgBillingStore::new(pool)),
                )
            }
        };

    let ledger = Ledger::new(ledger_store, config.currency);
    Ok(AppState::new(ledger, billing_store, config.billing.clone()))
}

/// Installs the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
