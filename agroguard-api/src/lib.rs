//! AgroGuard backend service
//!
//! REST backend for a crop disease advisory app: localized catalogs of
//! diseases, chemicals and markets backed by a failover document store,
//! plus an image analysis pipeline that chains a hosted vision model with
//! a deterministic local simulator.

pub mod analysis;
pub mod api;
pub mod error;
pub mod services;
pub mod store;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use analysis::Orchestrator;
use services::{
    CategoryService, ChemicalService, CommentService, DiseaseService, MarketService,
    SubmissionService,
};
use store::FailoverStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub diseases: DiseaseService,
    pub categories: CategoryService,
    pub chemicals: ChemicalService,
    pub markets: MarketService,
    pub submissions: SubmissionService,
    pub comments: CommentService,
    pub orchestrator: Arc<Orchestrator>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<FailoverStore>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            diseases: DiseaseService::new(store.clone()),
            categories: CategoryService::new(store.clone()),
            chemicals: ChemicalService::new(store.clone()),
            markets: MarketService::new(store.clone()),
            submissions: SubmissionService::new(store.clone()),
            comments: CommentService::new(store),
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::routes())
        .nest("/api/diseases", api::diseases::routes())
        .nest("/api/disease-categories", api::categories::routes())
        .nest("/api/chemicals", api::chemicals::routes())
        .nest("/api/markets", api::markets::routes())
        .nest("/api/pending-diseases", api::submissions::routes())
        .nest("/api/comments", api::comments::routes())
        .nest("/api", api::analyze::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
