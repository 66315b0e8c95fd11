//! World Hot Keys — Binary Entrypoint
//! Boots the Axum HTTP server and the background collection/retention tasks.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use world_hotkeys::api::{create_router, AppState};
use world_hotkeys::collect::adapters::{
    link_aggregator::LinkAggregatorAdapter, search_trends::SearchTrendsAdapter,
    social_trends::SocialTrendsAdapter, SourceAdapter,
};
use world_hotkeys::config::AppConfig;
use world_hotkeys::oauth::{ClientCredentialsAuth, NoToken, TokenProvider};
use world_hotkeys::pipeline::Pipeline;
use world_hotkeys::scheduler::{spawn_collector_task, spawn_retention_task, SchedulerCfg};
use world_hotkeys::store::memory::MemoryStore;
use world_hotkeys::store::Storage;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("world_hotkeys=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default()?;
    let timeout = Duration::from_secs(cfg.request_timeout_secs);
    let http = reqwest::Client::builder().timeout(timeout).build()?;

    // Token supply for the link aggregator: real client-credentials exchange
    // when configured, otherwise a token-less collaborator (the adapter then
    // contributes zero signals instead of failing the pipeline).
    let tokens: Arc<dyn TokenProvider> =
        match ClientCredentialsAuth::new(&cfg.link_aggregator, timeout) {
            Ok(auth) => Arc::new(auth),
            Err(e) => {
                tracing::warn!(error = %e, "link aggregator auth not configured");
                Arc::new(NoToken)
            }
        };

    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(SocialTrendsAdapter::from_config(
            &cfg.social_trends,
            http.clone(),
        )),
        Arc::new(LinkAggregatorAdapter::from_config(
            &cfg.link_aggregator,
            http.clone(),
            tokens,
        )),
        Arc::new(SearchTrendsAdapter::from_config(&cfg.search_trends, http)),
    ];

    let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
    let pipeline = Arc::new(Pipeline::new(adapters, store.clone(), cfg.top_n, timeout));

    spawn_collector_task(
        pipeline.clone(),
        SchedulerCfg {
            interval_secs: cfg.collection_interval_secs,
        },
    );
    spawn_retention_task(pipeline.reconciler().clone(), cfg.retention_days);

    let state = AppState {
        pipeline,
        store,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
