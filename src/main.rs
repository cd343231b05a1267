mod api_doc;
mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod seed;
mod spanner;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use config::{Config, StoreBackend};
use spanner::SpannerStore;
use state::AppState;
use std::sync::Arc;
use store::{CheeseStore, MemoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cheese_routes=info,tower_http=info")),
        )
        .init();

    tracing::info!("cheese-routes starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store: Arc<dyn CheeseStore> = match &config.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Spanner(spanner) => Arc::new(SpannerStore::connect(spanner).await?),
    };

    if let Some(path) = &config.seed_file {
        let cheeses = seed::load_seed_file(path)?;
        seed::seed_store(store.as_ref(), cheeses).await?;
    }

    let app = routes::router(AppState { store });

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("Listening on http://{}", address);
    tracing::info!("Swagger UI at http://{}{}", address, routes::SWAGGER_UI);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
