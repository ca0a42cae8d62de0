// ==========================================
// Training Ingest - HTTP server entry point
// ==========================================

use anyhow::Context;
use training_ingest::app::{build_router, AppState};
use training_ingest::config::AppConfig;
use training_ingest::{db, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!(version = training_ingest::VERSION, "{}", training_ingest::APP_NAME);
    tracing::info!("==================================================");

    let config = AppConfig::from_env().context("invalid configuration")?;
    db::set_slow_sql_threshold_ms(config.slow_sql_ms);

    let bind_addr = config.bind_addr;
    tracing::info!(
        db_path = %config.db_path,
        max_upload_bytes = config.max_upload_bytes,
        slow_sql_ms = config.slow_sql_ms,
        "configuration loaded"
    );

    let state = AppState::new(config).context("failed to initialize application state")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
