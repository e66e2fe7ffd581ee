// File: services/pixbridge_backend/src/main.rs
use pixbridge_backend::{build_router, AppState, StartupError};
use pixbridge_common::logging;
use pixbridge_config::{ensure_dotenv_loaded, load_config};
use pixbridge_db::{DbClient, SqlTransactionStore};
use pixbridge_inter::{InterClient, InterPixService};
use pixbridge_reconciler::{HttpWebhookNotifier, Reconciler, ReconcilerSettings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        error!("pixbridge stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let dotenv_path = ensure_dotenv_loaded();
    info!("Environment loaded from {}", dotenv_path);
    let config = Arc::new(load_config()?);

    let db = DbClient::new(&config).await?;
    let store = Arc::new(SqlTransactionStore::new(db.clone()));
    store.init_schema().await?;

    let inter_config = config
        .inter
        .as_ref()
        .ok_or(StartupError::MissingSection("inter"))?;
    let client = Arc::new(InterClient::new(inter_config)?);

    let reconciler = if config.reconciler.enabled {
        let reconciler = Reconciler::new(
            Arc::new(InterPixService::new(client.clone())),
            store.clone(),
            Arc::new(HttpWebhookNotifier::new(&config.webhook)?),
            ReconcilerSettings::from(&config.reconciler),
        );
        Some(Arc::new(reconciler).spawn())
    } else {
        info!("Reconciler disabled by configuration");
        None
    };

    let app = build_router(AppState { db, client, store });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = reconciler {
        handle.shutdown().await;
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
