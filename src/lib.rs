// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod collect;
pub mod config;
pub mod model;
pub mod oauth;
pub mod pipeline;
pub mod reconcile;
pub mod scheduler;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::collect::reduce;
pub use crate::model::{AreaTag, HotKeyRecord, RawSignal, ScoredSignal, SourceTag};
pub use crate::pipeline::{Pipeline, RunSummary};
pub use crate::reconcile::{Reconciler, UpsertReport};
