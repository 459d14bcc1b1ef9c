mod auth;
mod config;
mod openapi;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vcon_core::{QueueSubstrate, Registries};
use vcon_orchestrator::builtins::{InMemoryStorage, LogTracer, NoopLink};
use vcon_orchestrator::Supervisor;
use vcon_queue::{build_pool, RedisQueueSubstrate};

use crate::config::{load_root_config, AppConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "vcon_api=info,vcon_orchestrator=info,vcon_queue=info".into()
        }))
        .init();

    let app_config = AppConfig::from_env()?;
    let root_config_dto = load_root_config(&app_config.chain_config_path)?;

    let pool_size = estimate_pool_size(&root_config_dto);
    let pool =
        build_pool(&app_config.redis_url, pool_size).context("building redis connection pool")?;
    let substrate: Arc<dyn QueueSubstrate> = Arc::new(RedisQueueSubstrate::new(pool));

    let registries = default_registries();

    let supervisor = Supervisor::start(&root_config_dto, registries, substrate.clone())
        .await
        .context("supervisor failed to start")?;

    let app_state = AppState::new(supervisor.config_arc(), substrate.clone());

    let router = axum::Router::new()
        .merge(routes::router())
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&app_config.bind_addr)
        .await
        .with_context(|| format!("binding to {}", app_config.bind_addr))?;
    info!(addr = app_config.bind_addr, "vcon-api listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    supervisor.stop().await;
    Ok(())
}

fn estimate_pool_size(config: &vcon_contracts::RootConfigDto) -> usize {
    let total_workers: usize = config
        .chains
        .iter()
        .filter(|c| c.enabled)
        .map(|c| c.workers.unwrap_or(config.workers_per_chain) as usize)
        .sum();
    // §5: pool_size >= total_workers * (1 + storage_parallelism); storage_parallelism
    // isn't separately bounded per-chain in the config, so each worker is costed for
    // one extra concurrent storage connection, plus a small constant for the
    // admission HTTP surface's own connections.
    (total_workers * 2).max(4) + 2
}

fn default_registries() -> Registries {
    let mut registries = Registries::default();
    registries
        .links
        .register("noop", Arc::new(NoopLink), Default::default());
    registries
        .storages
        .register("mem", Arc::new(InMemoryStorage::new()), Default::default());
    registries
        .tracers
        .register("log", Arc::new(LogTracer), Default::default());
    registries
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
