pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api_connection::{OpenAiClient, TextGenerator};
use crate::config::ServerConfig;
use crate::generation::GenerationService;
use crate::query::QueryService;
use crate::store::{JsonFileBackend, RecipeStore};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecipeStore>,
    pub generation: Arc<GenerationService>,
    pub query: Arc<QueryService>,
}

impl AppState {
    pub fn new(store: Arc<RecipeStore>, generator: Arc<dyn TextGenerator>, config: &ServerConfig) -> Self {
        let generation = Arc::new(GenerationService::new(generator, store.clone(), &config.limits));
        let query = Arc::new(QueryService::new(store.clone(), generation.clone()));
        Self {
            store,
            generation,
            query,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/query", post(handlers::query))
        .route("/api/ai-recipe", post(handlers::ai_recipe))
        .route("/api/recipe/:id", get(handlers::get_recipe))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads the store, wires the OpenAI client and serves until Ctrl-C.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    if config.openai.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; recipe generation will fail");
    }

    let store = Arc::new(RecipeStore::load(
        Box::new(JsonFileBackend::new(&config.recipes_path)),
        config.limits.search_default_limit,
    ));
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiClient::new(config.openai.clone()));
    let app = router(AppState::new(store, generator, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, model = %config.openai.model, recipes = ?config.recipes_path, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
