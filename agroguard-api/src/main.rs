//! agroguard-api - Crop Disease Advisory Backend
//!
//! Serves the disease/chemical/market catalogs, the submission and comment
//! queues, and the crop image analysis endpoints over HTTP REST.

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use agroguard_api::analysis::{AnalysisProvider, Orchestrator, SimulatedProvider, VisionProvider};
use agroguard_api::store::{DocumentStore, FailoverStore, FileStore};
use agroguard_api::AppState;
use agroguard_common::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting agroguard-api");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    std::fs::create_dir_all(&settings.data_dir)?;

    // Primary document database
    let db_path = settings.database_path();
    info!("Database: {}", db_path.display());
    let primary = DocumentStore::connect(&db_path).await?;

    // File-backed fallback store
    let fallback_dir = settings.fallback_dir();
    info!("Fallback store: {}", fallback_dir.display());
    let fallback = FileStore::open(&fallback_dir).await?;

    let store = Arc::new(FailoverStore::new(Arc::new(primary), Arc::new(fallback)));

    // Analysis pipeline: hosted vision model when a credential is
    // configured, deterministic simulator otherwise and as fallback
    let remote: Option<Arc<dyn AnalysisProvider>> = match &settings.vision_api_key {
        Some(key) => {
            info!("Vision model configured, remote analysis enabled");
            Some(Arc::new(VisionProvider::new(key.clone())))
        }
        None => {
            warn!("No vision API key configured, analysis will use the simulator");
            None
        }
    };
    if settings.force_simulator {
        info!("Simulator-only analysis forced by configuration");
    }
    let orchestrator = Arc::new(Orchestrator::new(
        remote,
        Arc::new(SimulatedProvider::new()),
        settings.force_simulator,
    ));

    let state = AppState::new(store, orchestrator);

    let cors = CorsLayer::new()
        .allow_origin(settings.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(tower_http::cors::Any);

    let app = agroguard_api::build_router(state).layer(cors);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
