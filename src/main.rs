use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use cpd_portal::app::create_router;
use cpd_portal::app_state::AppState;
use cpd_portal::services::{dashboard::DashboardCache, notifier::InAppNotifier};
use cpd_portal::{config, db, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let env = config::init()?.clone();

    let telemetry_handles = telemetry::init_telemetry(None)
        .await
        .context("Failed to initialize telemetry")?;

    info!(name = %env.app.name, "starting up");

    let pool = db::init_pool().await.context("Failed to initialize database")?;

    let notifier = Arc::new(InAppNotifier::new(pool.clone()));
    let dashboard = Arc::new(DashboardCache::new(Duration::from_secs(
        env.app.dashboard_cache_ttl_secs,
    )));

    let addr = env.server_addr();
    let state = AppState::new(pool, env, notifier, dashboard);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    telemetry_handles.shutdown().await?;

    Ok(())
}
