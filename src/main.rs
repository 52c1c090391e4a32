use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use fifa_dashboard::config::{self, DashboardConfig};
use fifa_dashboard::dashboard::Dashboard;
use fifa_dashboard::dataset;
use fifa_dashboard::portraits::{HttpPortraitSource, NoPortraits, PortraitSource};
use fifa_dashboard::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut cfg = DashboardConfig::from_env()?;
    if let Some(path) = config::parse_dataset_arg() {
        cfg.dataset_path = path;
    }

    let players = dataset::load_players(&cfg.dataset_path)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;
    tracing::info!(players = players.len(), path = %cfg.dataset_path.display(), "dataset loaded");

    let portraits: Arc<dyn PortraitSource> = if cfg.fetch_portraits {
        Arc::new(HttpPortraitSource::new(cfg.portrait_timeout))
    } else {
        tracing::info!("portrait fetching disabled");
        Arc::new(NoPortraits)
    };

    let build_source = portraits.clone();
    let host = cfg.portrait_host.clone();
    // Building fetches portraits with the blocking client.
    let dashboard = tokio::task::spawn_blocking(move || Dashboard::build(&players, &host, build_source.as_ref()))
        .await
        .context("dashboard build task failed")?;

    let failed = dashboard.slots().iter().filter(|slot| !slot.is_ok()).count();
    if failed > 0 {
        tracing::warn!(failed, "some charts could not be built");
    }

    let state = AppState {
        dashboard: Arc::new(dashboard),
        portraits,
    };
    server::serve(state, cfg.bind_addr).await
}
