use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::judge::Judge0Client;
use server::ledger::SubmissionLedger;
use server::progress::ProgressTracker;
use server::state::AppState;
use server::store::DbStore;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database connected and schema synced");

    let store = Arc::new(DbStore::new(db.clone()));
    let judge = Arc::new(Judge0Client::new(&config.judge).context("Failed to build judge client")?);
    info!(
        base_url = %config.judge.base_url,
        max_concurrent = config.judge.max_concurrent_judgings,
        "Judge client ready"
    );

    let ledger = SubmissionLedger::new(
        judge,
        store.clone(),
        store.clone(),
        ProgressTracker::new(store),
        &config.judge,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config,
        ledger: Arc::new(ledger),
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await.context("Failed to close database")?;
    info!("Server stopped");
    Ok(())
}
