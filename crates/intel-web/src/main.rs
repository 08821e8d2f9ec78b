//! Stock intelligence web dashboard

use anyhow::Context;
use intel_stock::{Dashboard, DashboardConfig};
use intel_utils::{env_or, init_tracing, load_dotenv};
use intel_web::{AppState, create_router};
use tracing::info;

const DEFAULT_BIND: &str = "127.0.0.1:8501";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    let dashboard = Dashboard::from_config(config).context("failed to set up services")?;
    let state = AppState::new(dashboard).context("failed to load page templates")?;

    let bind = env_or("INTEL_BIND", DEFAULT_BIND);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("Dashboard listening on http://{bind}");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
