use anyhow::Context;
use mockshop_api::{app, AppState};
use mockshop_cart::CartEngine;
use mockshop_catalog::Catalog;
use mockshop_core::DocumentStore;
use mockshop_store::app_config::{Config, StorageBackend};
use mockshop_store::{JsonFileStore, MemoryStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mockshop_api=debug,mockshop_cart=debug,mockshop_catalog=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting mockshop on port {}", config.server.port);

    let store: Arc<dyn DocumentStore> = match config.catalog.backend {
        StorageBackend::File => Arc::new(
            JsonFileStore::open(config.catalog.data_dir.clone())
                .await
                .context("Failed to open catalog directory")?,
        ),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory catalog; purchases are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog = Catalog::new(store, config.catalog.document_key.clone())
        .with_max_attempts(config.catalog.purchase_max_attempts);

    match catalog.snapshot().await {
        Ok(products) => tracing::info!(
            "Catalog {} holds {} products",
            catalog.document_key(),
            products.len()
        ),
        Err(e) => tracing::warn!("Catalog {} is not readable yet: {}", catalog.document_key(), e),
    }

    let app = app(AppState::new(CartEngine::new(Arc::new(catalog))));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
