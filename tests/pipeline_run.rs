// tests/pipeline_run.rs
// End-to-end pipeline behavior with mock adapters: all-settled fan-out,
// summary contract, idempotent re-runs, storage-down abort.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use world_hotkeys::collect::adapters::SourceAdapter;
use world_hotkeys::model::{AreaTag, RawSignal, SourceTag};
use world_hotkeys::pipeline::Pipeline;
use world_hotkeys::store::memory::MemoryStore;

struct GoodAdapter {
    name: &'static str,
    source: SourceTag,
    keywords: Vec<&'static str>,
}

#[async_trait]
impl SourceAdapter for GoodAdapter {
    async fn fetch(&self) -> Result<Vec<RawSignal>> {
        Ok(self
            .keywords
            .iter()
            .map(|k| RawSignal::new(*k, AreaTag::Global, self.source))
            .collect())
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

struct FailingAdapter;

#[async_trait]
impl SourceAdapter for FailingAdapter {
    async fn fetch(&self) -> Result<Vec<RawSignal>> {
        Err(anyhow!("upstream returned 503"))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

struct SlowAdapter;

#[async_trait]
impl SourceAdapter for SlowAdapter {
    async fn fetch(&self) -> Result<Vec<RawSignal>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "slow"
    }
}

fn pipeline_with(
    adapters: Vec<Arc<dyn SourceAdapter>>,
    store: Arc<MemoryStore>,
    top_n: usize,
) -> Pipeline {
    Pipeline::new(adapters, store, top_n, Duration::from_millis(200))
}

#[tokio::test]
async fn one_failed_adapter_never_aborts_the_run() {
    let store = Arc::new(MemoryStore::new());
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(GoodAdapter {
            name: "search_trends",
            source: SourceTag::SearchTrends,
            keywords: vec!["chatgpt updates", "climate summit"],
        }),
        Arc::new(FailingAdapter),
    ];
    let pipeline = pipeline_with(adapters, store, 10);

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.retained, 2);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("failing"));
    assert!(summary
        .per_source
        .iter()
        .any(|(name, count)| name == "failing" && *count == 0));
}

#[tokio::test]
async fn slow_adapter_times_out_as_its_own_failure() {
    let store = Arc::new(MemoryStore::new());
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(SlowAdapter),
        Arc::new(GoodAdapter {
            name: "social_trends",
            source: SourceTag::SocialTrends,
            keywords: vec!["mars landing attempt"],
        }),
    ];
    let pipeline = pipeline_with(adapters, store, 10);

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.retained, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("timed out"));
}

#[tokio::test]
async fn rerun_on_identical_input_only_updates() {
    let store = Arc::new(MemoryStore::new());
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(GoodAdapter {
        name: "search_trends",
        source: SourceTag::SearchTrends,
        keywords: vec!["chatgpt updates", "world cup final", "mars landing"],
    })];
    let pipeline = pipeline_with(adapters, store.clone(), 10);

    let first = pipeline.run_once().await.unwrap();
    assert_eq!(first.inserted, 3);
    assert_eq!(first.updated, 0);

    let second = pipeline.run_once().await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 3);
    assert_eq!(second.failed, 0);
}

#[tokio::test]
async fn cross_source_duplicate_is_persisted_once() {
    let store = Arc::new(MemoryStore::new());
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(GoodAdapter {
            name: "search_trends",
            source: SourceTag::SearchTrends,
            keywords: vec!["ChatGPT Updates"],
        }),
        Arc::new(GoodAdapter {
            name: "social_trends",
            source: SourceTag::SocialTrends,
            keywords: vec!["chatgpt updates"],
        }),
    ];
    let pipeline = pipeline_with(adapters, store, 10);

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.retained, 1);
    assert_eq!(summary.inserted, 1);

    let rows = pipeline.reconciler().query(None, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    // Display keyword comes from the winning (higher-trust) signal.
    assert_eq!(rows[0].hot_key, "ChatGPT Updates");
}

#[tokio::test]
async fn unavailable_storage_aborts_before_any_writes() {
    let store = Arc::new(MemoryStore::new());
    store.set_unavailable(true);
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(GoodAdapter {
        name: "search_trends",
        source: SourceTag::SearchTrends,
        keywords: vec!["chatgpt updates"],
    })];
    let pipeline = pipeline_with(adapters, store.clone(), 10);

    assert!(pipeline.run_once().await.is_err());

    store.set_unavailable(false);
    let rows = pipeline.reconciler().query(None, 10).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn top_n_caps_what_gets_persisted() {
    let store = Arc::new(MemoryStore::new());
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(GoodAdapter {
        name: "search_trends",
        source: SourceTag::SearchTrends,
        keywords: vec![
            "first trending topic",
            "second trending topic",
            "third trending topic",
            "fourth trending topic",
        ],
    })];
    let pipeline = pipeline_with(adapters, store, 2);

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.retained, 2);
    assert_eq!(summary.inserted, 2);
}
