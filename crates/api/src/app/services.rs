//! Store selection and the shared state handed to every handler.

use std::sync::Arc;

use anyhow::Context;

use catalog_infra::{
    CatalogConfig, CatalogQueryService, CatalogStore, InMemoryCatalogStore, PostgresCatalogStore,
};

pub type DynCatalogStore = Arc<dyn CatalogStore>;

#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogQueryService<DynCatalogStore>,
    /// Include internal detail in 5xx bodies.
    pub diagnostics: bool,
}

impl AppServices {
    pub fn new(store: DynCatalogStore, diagnostics: bool) -> Self {
        Self {
            catalog: CatalogQueryService::new(store),
            diagnostics,
        }
    }
}

/// Connect to Postgres when `DATABASE_URL` is configured, otherwise fall back
/// to the in-memory store.
pub async fn build_services(config: &CatalogConfig) -> anyhow::Result<AppServices> {
    let store: DynCatalogStore = match &config.database_url {
        Some(url) => {
            let store =
                PostgresCatalogStore::connect(url, config.max_connections, config.store_timeout)
                    .await
                    .context("failed to connect to the catalog database")?;
            tracing::info!(
                max_connections = config.max_connections,
                timeout_ms = config.store_timeout.as_millis() as u64,
                "using postgres catalog store"
            );
            Arc::new(store)
        }
        None if config.seed_demo => {
            let store = InMemoryCatalogStore::seed_demo_catalog()
                .context("failed to seed the demo catalog")?;
            tracing::info!("using in-memory catalog store with demo data");
            Arc::new(store)
        }
        None => {
            tracing::info!("using empty in-memory catalog store");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    Ok(AppServices::new(store, config.diagnostics))
}
