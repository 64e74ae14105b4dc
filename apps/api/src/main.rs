mod assist;
mod config;
mod db;
mod errors;
mod export;
mod layout;
mod llm_client;
mod models;
mod projects;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assist::{ContentAssistant, LlmAssistant, MockAssistant};
use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::projects::templates::demo_project;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryProjectStore, PgProjectStore, ProjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let assistant = build_assistant(&config)?;

    let state = AppState {
        store,
        assistant,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// PostgreSQL in production; the memory store, seeded with the demo project, otherwise.
async fn build_store(config: &Config) -> Result<Arc<dyn ProjectStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool = create_pool(url).await?;
            info!("Project store: postgres");
            Ok(Arc::new(PgProjectStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = MemoryProjectStore::new();
            store
                .seed(config.demo_user_id, demo_project())
                .await
                .context("Failed to seed demo project")?;
            warn!(
                "Project store: memory (demo mode, user {}); nothing is persisted",
                config.demo_user_id
            );
            Ok(Arc::new(store))
        }
    }
}

fn build_assistant(config: &Config) -> Result<Arc<dyn ContentAssistant>> {
    match config.anthropic_api_key.clone() {
        Some(key) => {
            let llm = LlmClient::new(key)?;
            info!("Content assistant: LLM (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmAssistant::new(llm)))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; using the offline mock assistant");
            Ok(Arc::new(MockAssistant))
        }
    }
}
