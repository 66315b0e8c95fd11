// src/api.rs
// Thin HTTP surface: health probe, read path, manual trigger, table stats.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::model::{AreaTag, HotKeyRecord};
use crate::pipeline::{Pipeline, RunSummary};
use crate::store::{Storage, StoreStats};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<dyn Storage>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/hotkeys", get(list_hotkeys))
        .route("/api/collect", post(collect_now))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.store.health_check().await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
    }
}

#[derive(serde::Deserialize)]
struct HotKeysQuery {
    area: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

async fn list_hotkeys(
    State(state): State<AppState>,
    Query(q): Query<HotKeysQuery>,
) -> Result<Json<Vec<HotKeyRecord>>, (StatusCode, String)> {
    let area = match q.area.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            AreaTag::parse(s)
                .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown area '{s}'")))?,
        ),
    };
    let rows = state
        .pipeline
        .reconciler()
        .query(area, q.limit)
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
    Ok(Json(rows))
}

async fn collect_now(
    State(state): State<AppState>,
) -> Result<Json<RunSummary>, (StatusCode, String)> {
    state
        .pipeline
        .run_once()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, format!("{e:#}")))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StoreStats>, (StatusCode, String)> {
    state
        .store
        .stats()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}
