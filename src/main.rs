//! ledger_engine - account ledger service
//!
//! Serves the ledger over HTTP: accounts, credits, debits, transfers and
//! the hash-chained transaction log.

use std::net::SocketAddr;

use ledger_engine::{api, db, Config, Ledger};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Production logs are JSON lines.
fn init_tracing(json: bool) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ledger_engine=debug,tower_http=debug".into()),
    );

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.is_production());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting ledger_engine server");
    tracing::info!("Opening ledger store...");

    let ledger = Ledger::connect(&config).await?;
    db::verify_connection(ledger.store().pool()).await?;

    if !db::check_schema(ledger.store().pool()).await? {
        tracing::error!("Database schema is not complete. Migrations did not apply.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Ledger store ready");
    tracing::info!("Listening on http://{}", addr);

    let app = api::app(ledger.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down...");
    ledger.store().close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Resolve once Ctrl+C or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
